#![allow(dead_code)]

use ne_noise::{Action, DhState, HandshakeState, ProtocolId, RandomState, Role};

pub const PSK: [u8; 32] = [0x5a; 32];

/// A static keypair generated from `seed`.
pub fn static_key(id: ProtocolId, seed: u8) -> DhState {
    let mut key = DhState::new(id.dh);
    key.generate_keypair(&mut RandomState::from_seed([seed; 32]))
        .unwrap();
    key
}

fn copy_keypair(slot: &mut DhState, key: &DhState) {
    slot.set_keypair(key.private_key().unwrap(), key.public_key().unwrap())
        .unwrap();
}

/// Builds a started initiator/responder pair, supplying whatever keys the pattern needs.
pub fn started_pair(
    id: ProtocolId,
    initiator_static: &DhState,
    responder_static: &DhState,
    prologue: &[u8],
) -> (HandshakeState, HandshakeState) {
    let mut initiator =
        HandshakeState::with_random_state(id, Role::Initiator, RandomState::from_seed([0xa1; 32]));
    let mut responder =
        HandshakeState::with_random_state(id, Role::Responder, RandomState::from_seed([0xb2; 32]));

    for (state, local, remote) in [
        (&mut initiator, initiator_static, responder_static),
        (&mut responder, responder_static, initiator_static),
    ] {
        state.set_prologue(prologue).unwrap();
        if let Some(slot) = state.local_keypair_mut() {
            copy_keypair(slot, local);
        }
        if let Some(slot) = state.remote_public_key_mut() {
            slot.set_public_key(remote.public_key().unwrap()).unwrap();
        }
        if id.is_psk() {
            state.set_pre_shared_key(&PSK).unwrap();
        }
        assert!(!state.needs_local_keypair());
        assert!(!state.needs_remote_public_key());
        state.start().unwrap();
    }
    (initiator, responder)
}

pub fn pair(id: ProtocolId) -> (HandshakeState, HandshakeState) {
    started_pair(id, &static_key(id, 1), &static_key(id, 2), b"prologue")
}

/// Exchanges messages until both sides reach `Split`, checking every payload arrives intact.
/// Returns the number of messages sent.
pub fn drive(initiator: &mut HandshakeState, responder: &mut HandshakeState) -> usize {
    let mut count = 0;
    loop {
        let (writer, reader) = match (initiator.action(), responder.action()) {
            (Action::WriteMessage, Action::ReadMessage) => (&mut *initiator, &mut *responder),
            (Action::ReadMessage, Action::WriteMessage) => (&mut *responder, &mut *initiator),
            (Action::Split, Action::Split) => return count,
            other => panic!("unexpected actions {other:?}"),
        };
        let payload = format!("payload {count}").into_bytes();
        let message = writer.write_message(&payload).unwrap();
        assert_eq!(reader.read_message(&message).unwrap(), payload);
        count += 1;
    }
}
