use proptest::prelude::*;

use chat_bridge::{
    ConnectionManager, DisplaySurface, Endpoint, Key, MemoryTransport, MessageRouter,
    ProtocolVariant, RouterOptions, SendOutcome, TransportEvent, UiEvent,
};

fn open_router(variant: ProtocolVariant) -> (MessageRouter<MemoryTransport>, MemoryTransport) {
    let transport = MemoryTransport::new();
    let endpoint = Endpoint::explicit("ws://localhost:8765").unwrap();
    let connection = ConnectionManager::new(transport.clone(), endpoint, Some("alice".into()));
    let options = RouterOptions {
        variant,
        ..Default::default()
    };
    let mut router = MessageRouter::new(connection, DisplaySurface::new(5), options);
    router.handle_transport_event(TransportEvent::Open);
    (router, transport)
}

fn arb_variant() -> impl Strategy<Value = ProtocolVariant> {
    prop_oneof![
        Just(ProtocolVariant::ServerLabels),
        Just(ProtocolVariant::ClientLabels),
    ]
}

/// Text with at least one visible character, possibly padded.
fn arb_message() -> impl Strategy<Value = String> {
    ("[ \t]{0,3}", "[a-zA-Z0-9][a-zA-Z0-9 !?.]{0,20}", "[ \t]{0,3}")
        .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t]{0,8}"
}

// --- Send path ---

proptest! {
    #[test]
    fn each_send_intent_transmits_one_frame(
        variant in arb_variant(),
        messages in prop::collection::vec(arb_message(), 1..10),
    ) {
        let (mut router, transport) = open_router(variant);
        for (i, msg) in messages.iter().enumerate() {
            router.handle_ui_event(UiEvent::SetInput(msg.clone()));
            let outcome = router.handle_ui_event(UiEvent::KeyUp(Key::Enter));
            prop_assert_eq!(outcome, Some(SendOutcome::Sent));
            prop_assert_eq!(router.input().value(), "");
            // identity frame + one frame per send so far
            prop_assert_eq!(transport.sent().len(), i + 2);
        }

        let frames = transport.sent();
        for (frame, msg) in frames[1..].iter().zip(&messages) {
            let expected = match variant {
                ProtocolVariant::ServerLabels => msg.trim().to_string(),
                ProtocolVariant::ClientLabels => format!("{}\n", msg.trim()),
            };
            prop_assert_eq!(frame, &expected);
        }
    }

    #[test]
    fn blank_input_is_never_sent(variant in arb_variant(), blank in arb_blank(), click in any::<bool>()) {
        let (mut router, transport) = open_router(variant);
        router.handle_ui_event(UiEvent::SetInput(blank.clone()));
        let event = if click { UiEvent::Click } else { UiEvent::KeyUp(Key::Enter) };
        prop_assert_eq!(router.handle_ui_event(event), Some(SendOutcome::Empty));
        prop_assert_eq!(transport.sent(), vec!["alice".to_string()]);
        prop_assert_eq!(router.input().value(), blank.as_str());
        prop_assert!(router.input().has_focus());
        prop_assert!(router.surface().is_empty());
    }
}

// --- Receive path ---

proptest! {
    #[test]
    fn server_labelled_frames_render_in_order(
        frames in prop::collection::vec("[a-z]{1,8}: [a-z ]{0,12}", 0..20),
    ) {
        let (mut router, _) = open_router(ProtocolVariant::ServerLabels);
        for frame in &frames {
            router.handle_transport_event(TransportEvent::Message(frame.clone()));
            prop_assert!(router.surface().is_scrolled_to_bottom());
        }
        prop_assert_eq!(router.surface().content(), frames.join("\n"));
    }

    #[test]
    fn client_labelled_frames_render_verbatim(
        frames in prop::collection::vec("[a-z]{1,8}: [a-z ]{0,12}\n", 0..20),
    ) {
        let (mut router, _) = open_router(ProtocolVariant::ClientLabels);
        for frame in &frames {
            router.handle_transport_event(TransportEvent::Message(frame.clone()));
            prop_assert!(router.surface().is_scrolled_to_bottom());
        }
        prop_assert_eq!(router.surface().content(), frames.concat());
    }

    #[test]
    fn every_frame_appears_in_arrival_order(
        variant in arb_variant(),
        frames in prop::collection::vec("[a-z]{1,6}", 1..15),
    ) {
        let (mut router, _) = open_router(variant);
        for frame in &frames {
            router.handle_transport_event(TransportEvent::Message(frame.clone()));
        }
        let content = router.surface().content();
        let mut cursor = 0;
        for frame in &frames {
            let found = content[cursor..].find(frame.as_str());
            prop_assert!(found.is_some(), "{frame:?} missing after offset {cursor}");
            cursor += found.unwrap() + frame.len();
        }
    }
}

// --- Idle ---

proptest! {
    #[test]
    fn idle_ticks_change_nothing(
        variant in arb_variant(),
        draft in "[a-z ]{0,10}",
        frames in prop::collection::vec("[a-z]{1,6}", 0..5),
        ticks in 0usize..200,
    ) {
        let (mut router, transport) = open_router(variant);
        for frame in &frames {
            router.handle_transport_event(TransportEvent::Message(frame.clone()));
        }
        router.handle_ui_event(UiEvent::SetInput(draft.clone()));

        let before = router.surface().content().to_string();
        for _ in 0..ticks {
            router.tick();
        }
        prop_assert_eq!(router.surface().content(), before.as_str());
        prop_assert_eq!(router.input().value(), draft.as_str());
        prop_assert_eq!(transport.sent().len(), 1);
    }
}
