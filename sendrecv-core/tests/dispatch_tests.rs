// Tests for the event-kind dispatch table
// Uses plain stand-in handle types so no GStreamer is needed

use sendrecv_core::{Error, Event, EventKind, Handler, HandlerTable};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
struct Element(&'static str);

#[derive(Debug, Clone, PartialEq)]
struct Pad(&'static str);

type Table = HandlerTable<Element, Pad>;

#[test]
fn test_signal_names_match_webrtcbin() {
    assert_eq!(EventKind::NegotiationNeeded.signal_name(), "on-negotiation-needed");
    assert_eq!(EventKind::IceCandidate.signal_name(), "on-ice-candidate");
    assert_eq!(EventKind::PadAdded.signal_name(), "pad-added");
    assert_eq!(sendrecv_core::CREATE_OFFER, "create-offer");
}

#[test]
fn test_parse_event_kind_from_signal_name() {
    for kind in EventKind::ALL {
        assert_eq!(kind.signal_name().parse::<EventKind>().unwrap(), kind);
    }

    let err = "on-data-channel".parse::<EventKind>().unwrap_err();
    assert!(matches!(err, Error::UnknownEvent(name) if name == "on-data-channel"));
}

#[test]
fn test_arity_per_kind() {
    assert_eq!(EventKind::NegotiationNeeded.arity(), 1);
    assert_eq!(EventKind::IceCandidate.arity(), 3);
    assert_eq!(EventKind::PadAdded.arity(), 2);
}

#[test]
fn test_register_rejects_mismatched_signature() {
    let mut table = Table::new();
    let handler = Handler::pad_added(|_: &Element, _: &Pad| {});

    let err = table
        .register(EventKind::IceCandidate, handler)
        .unwrap_err();

    match err {
        Error::SignatureMismatch { event, found, .. } => {
            assert_eq!(event, EventKind::IceCandidate);
            assert_eq!(found, EventKind::PadAdded);
        }
        other => panic!("Wrong error: {:?}", other),
    }
    assert!(table.is_empty());
}

#[test]
fn test_register_by_name() {
    let mut table = Table::new();
    table
        .register_by_name("on-negotiation-needed", Handler::negotiation_needed(|_: &Element| {}))
        .unwrap();
    assert_eq!(table.handler_count(EventKind::NegotiationNeeded), 1);

    let err = table
        .register_by_name("no-such-signal", Handler::negotiation_needed(|_: &Element| {}))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEvent(_)));

    let err = table
        .register_by_name("pad-added", Handler::negotiation_needed(|_: &Element| {}))
        .unwrap_err();
    assert!(matches!(err, Error::SignatureMismatch { .. }));
}

#[test]
fn test_dispatch_ice_candidate_arguments() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let mut table = Table::new();
    table.on_ice_candidate(move |element, line, candidate| {
        sink.lock()
            .unwrap()
            .push((element.clone(), line, candidate.to_string()));
    });

    let ran = table.dispatch(&Event::IceCandidate {
        element: Element("sendrecv"),
        mline_index: 0,
        candidate: "candidate:1 1 UDP 2015363327 192.168.1.2 52000 typ host".to_string(),
    });

    assert_eq!(ran, 1);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, Element("sendrecv"));
    assert_eq!(seen[0].1, 0);
    assert!(seen[0].2.starts_with("candidate:1"));
}

#[test]
fn test_dispatch_only_reaches_matching_kind() {
    let negotiations = Arc::new(AtomicUsize::new(0));
    let pads = Arc::new(AtomicUsize::new(0));

    let mut table = Table::new();
    let n = negotiations.clone();
    let p = pads.clone();
    table
        .on_negotiation_needed(move |_| {
            n.fetch_add(1, Ordering::SeqCst);
        })
        .on_pad_added(move |_, pad| {
            assert_eq!(pad, &Pad("src_0"));
            p.fetch_add(1, Ordering::SeqCst);
        });

    table.dispatch(&Event::PadAdded {
        element: Element("sendrecv"),
        pad: Pad("src_0"),
    });

    assert_eq!(negotiations.load(Ordering::SeqCst), 0);
    assert_eq!(pads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_dispatch_runs_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut table = Table::new();
    for i in 0..3 {
        let order = order.clone();
        table.on_negotiation_needed(move |_| order.lock().unwrap().push(i));
    }

    let ran = table.dispatch(&Event::NegotiationNeeded {
        element: Element("sendrecv"),
    });

    assert_eq!(ran, 3);
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn test_dispatch_without_handlers() {
    let table = Table::new();
    let ran = table.dispatch(&Event::NegotiationNeeded {
        element: Element("sendrecv"),
    });
    assert_eq!(ran, 0);
    assert!(table.kinds().is_empty());
}

#[test]
fn test_kinds_lists_registered_only() {
    let mut table = Table::new();
    table.on_pad_added(|_, _| {}).on_negotiation_needed(|_| {});

    assert_eq!(
        table.kinds(),
        vec![EventKind::NegotiationNeeded, EventKind::PadAdded]
    );
}

#[test]
fn test_concurrent_dispatch_from_shared_table() {
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let mut table = Table::new();
    table.on_ice_candidate(move |_, _, _| {
        c.fetch_add(1, Ordering::SeqCst);
    });
    let table = Arc::new(table);

    let threads: Vec<_> = (0..4)
        .map(|i| {
            let table = table.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    table.dispatch(&Event::IceCandidate {
                        element: Element("sendrecv"),
                        mline_index: i,
                        candidate: String::new(),
                    });
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(count.load(Ordering::SeqCst), 100);
}
