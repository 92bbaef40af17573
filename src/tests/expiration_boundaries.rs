// Age checks around max_age with a controlled clock.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::errors::BadData;
    use crate::helpers::time::{timestamp_to_datetime, ManualClock};
    use crate::serializer::{PayloadFormat, TimedSerializer};
    use crate::tests::common::frozen_timed_signer;

    const T0: i64 = 1_700_000_000;

    #[test]
    fn age_equal_to_max_age_is_accepted() {
        for max_age in [0u64, 1, 60, 3600, 86_400] {
            let (signer, clock) = frozen_timed_signer(T0);
            let token = signer.sign(b"v");
            clock.set(T0 + max_age as i64);
            assert!(signer.validate(&token, Some(max_age)), "max_age {}", max_age);
            clock.advance(1);
            assert!(!signer.validate(&token, Some(max_age)), "max_age {} + 1", max_age);
        }
    }

    #[test]
    fn expired_error_reports_details() {
        let (signer, clock) = frozen_timed_signer(T0);
        let token = signer.sign(b"payload");
        clock.advance(120);

        let err = signer.unsign(&token, Some(100)).unwrap_err();
        assert!(err.is_expired());
        assert!(err.is_time_error());
        assert!(err.is_signature_error());
        assert_eq!(err.payload(), Some(&b"payload"[..]));
        assert_eq!(err.date_signed(), timestamp_to_datetime(T0));
        assert_eq!(err.to_string(), "Signature age 120 > 100 seconds");
    }

    #[test]
    fn no_max_age_never_expires() {
        let (signer, clock) = frozen_timed_signer(T0);
        let token = signer.sign(b"v");
        clock.advance(10 * 365 * 86_400);
        assert_eq!(signer.unsign(&token, None).unwrap(), b"v");
    }

    #[test]
    fn clock_going_backwards_is_rejected_only_with_max_age() {
        let (signer, clock) = frozen_timed_signer(T0);
        let token = signer.sign(b"v");
        clock.set(T0 - 5);
        assert!(signer.validate(&token, None));
        let err = signer.unsign(&token, Some(3600)).unwrap_err();
        assert!(matches!(err, BadData::Expired { age: -5, .. }));
        assert!(err.to_string().contains("< 0 seconds"));
    }

    #[test]
    fn epoch_timestamp_round_trips() {
        let (signer, _) = frozen_timed_signer(0);
        let token = signer.sign(b"v");
        let (value, signed_at) = signer.unsign_with_timestamp(&token, None).unwrap();
        assert_eq!(value, b"v");
        assert_eq!(signed_at.timestamp(), 0);
    }

    #[test]
    fn timed_serializer_expires_payloads() {
        let clock = Arc::new(ManualClock::new(T0));
        let s = TimedSerializer::from_signer(frozen_timed_signer(T0).0, PayloadFormat::UrlSafe)
            .with_clock(clock.clone());

        let token = s.dumps(&serde_json::json!({"user": 9})).unwrap();
        clock.advance(30);
        let (value, signed_at): (serde_json::Value, _) =
            s.loads_with_timestamp(&token, Some(30)).unwrap();
        assert_eq!(value["user"], 9);
        assert_eq!(signed_at.timestamp(), T0);

        clock.advance(1);
        assert!(s.loads::<serde_json::Value>(&token, Some(30)).unwrap_err().is_expired());

        // the payload is still recoverable for diagnostics
        let (ok, value) = s.loads_unsafe::<serde_json::Value>(&token, Some(30));
        assert!(!ok);
        assert_eq!(value.unwrap()["user"], 9);
    }
}
