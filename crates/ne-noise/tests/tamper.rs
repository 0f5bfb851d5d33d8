mod common;

use common::{drive, pair};
use ne_noise::{Action, NoiseError, ProtocolId};
use proptest::prelude::*;

fn xx() -> ProtocolId {
    "Noise_XX_25519_ChaChaPoly_BLAKE2s".parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn flipped_bit_in_handshake_message_is_rejected(
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
        payload in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let (mut initiator, mut responder) = pair(xx());
        let first = initiator.write_message(b"").unwrap();
        responder.read_message(&first).unwrap();

        // The second XX message is fully covered by the ee-derived key.
        let mut second = responder.write_message(&payload).unwrap();
        let i = index.index(second.len());
        second[i] ^= 1 << bit;
        prop_assert_eq!(initiator.read_message(&second), Err(NoiseError::MacFailure));
        prop_assert_eq!(initiator.action(), Action::Failed);
    }

    #[test]
    fn flipped_bit_in_transport_message_is_rejected(
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let (mut initiator, mut responder) = pair(xx());
        drive(&mut initiator, &mut responder);
        let (mut send, _) = initiator.split().unwrap();
        let (_, mut recv) = responder.split().unwrap();

        let mut ct = send.encrypt(&payload).unwrap();
        let i = index.index(ct.len());
        ct[i] ^= 1 << bit;
        prop_assert_eq!(recv.decrypt(&ct), Err(NoiseError::MacFailure));
        prop_assert_eq!(recv.nonce(), 0);
    }

    #[test]
    fn arbitrary_transport_payloads_round_trip(
        payloads in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..512), 1..8),
    ) {
        let (mut initiator, mut responder) = pair(xx());
        drive(&mut initiator, &mut responder);
        let (mut i_send, mut i_recv) = initiator.split().unwrap();
        let (mut r_send, mut r_recv) = responder.split().unwrap();

        for payload in &payloads {
            let ct = i_send.encrypt(payload).unwrap();
            prop_assert_eq!(&r_recv.decrypt(&ct).unwrap(), payload);
            let ct = r_send.encrypt(payload).unwrap();
            prop_assert_eq!(&i_recv.decrypt(&ct).unwrap(), payload);
        }
    }
}
