#[cfg(test)]
mod tests {
    use crate::logic::{is_valid_email, validate_booking, BookingError, REQUIRED_FIELDS};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn complete_booking() -> Value {
        json!({
            "date": "2025-08-25",
            "time": "15:30",
            "datetime": "2025-08-25T15:30:00-03:00",
            "name": "Ana Souza",
            "rg": "12.345.678-9",
            "cpf": "123.456.789-09",
            "email": "ana@example.com",
            "phone": "+55 11 91234-5678",
            "fetiche": "—",
            "conheceu": "Instagram",
            "duration": "60",
            "reason": "Primeira sessão"
        })
    }

    fn before_booking() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn complete_payload_passes() {
        assert_eq!(validate_booking(&complete_booking(), before_booking()), Ok(()));
    }

    #[test]
    fn every_required_field_is_enforced() {
        for field in REQUIRED_FIELDS {
            let mut data = complete_booking();
            data.as_object_mut().unwrap().remove(*field);
            assert_eq!(
                validate_booking(&data, before_booking()),
                Err(BookingError::MissingField(field.to_string())),
                "removing {field} should fail"
            );
        }
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let mut data = complete_booking();
        data["name"] = json!("   ");
        assert_eq!(
            validate_booking(&data, before_booking()),
            Err(BookingError::MissingField("name".into()))
        );
    }

    #[test]
    fn numeric_duration_is_accepted() {
        let mut data = complete_booking();
        data["duration"] = json!(60);
        assert_eq!(validate_booking(&data, before_booking()), Ok(()));
    }

    #[test]
    fn email_shape_is_checked() {
        let mut data = complete_booking();
        data["email"] = json!("sem-arroba");
        assert_eq!(
            validate_booking(&data, before_booking()),
            Err(BookingError::InvalidEmail)
        );
    }

    #[test]
    fn booking_instant_must_be_in_the_future() {
        let after = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
        assert_eq!(
            validate_booking(&complete_booking(), after),
            Err(BookingError::PastDateTime)
        );
        // exactly now is also too late
        let exact = Utc.with_ymd_and_hms(2025, 8, 25, 18, 30, 0).unwrap();
        assert_eq!(
            validate_booking(&complete_booking(), exact),
            Err(BookingError::PastDateTime)
        );
    }

    #[test]
    fn unparseable_datetime_is_rejected() {
        let mut data = complete_booking();
        data["datetime"] = json!("25/08/2025 15:30");
        assert_eq!(
            validate_booking(&data, before_booking()),
            Err(BookingError::InvalidDateTime)
        );
    }

    #[test]
    fn email_shape_matcher() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("example.com"));
        assert!(!is_valid_email(""));
    }
}
