//! Tests for binding sets, batch accumulation and NULL typing

use chrono::NaiveTime;
use flakebind::{
    BindSnapshot, BindingSet, Error, Location, NativeValue, Number, RemoteType, ValueDecoder,
    ValueKind, WireValue,
};

fn read_i64(wire: &WireValue) -> Option<i64> {
    match ValueDecoder::default().decode_as(wire, ValueKind::BigInt, None).unwrap() {
        NativeValue::BigInt(v) => Some(v),
        NativeValue::Null(_) => None,
        other => panic!("unexpected value {:?}", other),
    }
}

mod batch_tests {
    use super::*;

    #[test]
    fn test_n_rows_in_call_order() {
        let mut binds = BindingSet::new(2);
        for i in 0..10i64 {
            binds.bind(1, &NativeValue::BigInt(i), None).unwrap();
            binds.bind(2, &NativeValue::BigInt(-i), None).unwrap();
            binds.add_batch_row().unwrap();
        }

        let snapshot = binds.snapshot();
        assert_eq!(snapshot.row_count(), 10);
        for (i, row) in snapshot.rows().iter().enumerate() {
            assert_eq!(read_i64(&row[0]), Some(i as i64));
            assert_eq!(read_i64(&row[1]), Some(-(i as i64)));
        }
    }

    #[test]
    fn test_last_bind_wins() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.bind(1, &NativeValue::Int(2), None).unwrap();
        binds.add_batch_row().unwrap();
        binds.bind(1, &NativeValue::Int(3), None).unwrap();
        binds.bind_null(1, RemoteType::NUMBER).unwrap();
        binds.add_batch_row().unwrap();

        let snapshot = binds.snapshot();
        assert_eq!(read_i64(&snapshot.rows()[0][0]), Some(2));
        assert_eq!(read_i64(&snapshot.rows()[1][0]), None);
    }

    #[test]
    fn test_incomplete_row_leaves_state_unchanged() {
        let mut binds = BindingSet::new(3);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.bind(2, &NativeValue::Int(2), None).unwrap();
        binds.bind(3, &NativeValue::Int(3), None).unwrap();
        binds.add_batch_row().unwrap();
        let before = binds.snapshot();

        binds.bind(2, &NativeValue::Int(20), None).unwrap();
        let err = binds.add_batch_row().unwrap_err();
        match err {
            Error::IncompleteBinding { missing } => assert_eq!(missing, vec![1, 3]),
            other => panic!("expected IncompleteBinding, got {:?}", other),
        }

        assert_eq!(binds.snapshot(), before);
        assert_eq!(binds.batch_row_count(), 1);
        assert_eq!(binds.missing_positions(), vec![1, 3]);
    }

    #[test]
    fn test_rows_may_carry_different_types() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.add_batch_row().unwrap();
        binds
            .bind(1, &NativeValue::Decimal(Number::parse("1.5").unwrap()), None)
            .unwrap();
        binds.add_batch_row().unwrap();

        let snapshot = binds.snapshot();
        assert_eq!(snapshot.rows()[0][0].remote_type(), RemoteType::NUMBER);
        assert_eq!(
            snapshot.rows()[1][0].remote_type(),
            RemoteType::Fixed { precision: 38, scale: 1 }
        );
        assert_eq!(binds.shape(), vec![Some(RemoteType::Fixed { precision: 38, scale: 1 })]);
    }

    #[test]
    fn test_clear_then_rebind() {
        let mut binds = BindingSet::new(1);
        binds.bind(1, &NativeValue::Int(1), None).unwrap();
        binds.add_batch_row().unwrap();
        binds.clear();
        assert_eq!(binds.param_count(), 1);
        assert!(binds.snapshot().is_empty());

        binds.bind(1, &NativeValue::Int(9), None).unwrap();
        binds.add_batch_row().unwrap();
        assert_eq!(read_i64(&binds.snapshot().rows()[0][0]), Some(9));
    }

    #[test]
    fn test_snapshot_survives_framing() {
        let mut binds = BindingSet::new(3);
        binds.bind(1, &NativeValue::BigInt(i64::MIN), None).unwrap();
        binds.bind_null(2, RemoteType::TIME).unwrap();
        binds
            .bind(3, &NativeValue::Time(NaiveTime::from_hms_nano_opt(1, 2, 3, 4).unwrap()), None)
            .unwrap();
        binds.add_batch_row().unwrap();

        let snapshot = binds.snapshot();
        let parsed = BindSnapshot::from_bytes(snapshot.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.column_count(), 3);
    }
}

mod null_tests {
    use super::*;

    #[test]
    fn test_null_keeps_intended_type() {
        let mut binds = BindingSet::new(2);
        binds.bind_null(1, RemoteType::NUMBER).unwrap();
        binds.bind_null(2, RemoteType::TIME).unwrap();
        let row = binds.current_row().unwrap();
        assert_eq!(row.rows()[0][0], WireValue::null(RemoteType::NUMBER));
        assert_eq!(row.rows()[0][1], WireValue::null(RemoteType::TIME));
    }

    #[test]
    fn test_null_value_and_null_call_are_equivalent() {
        for remote_type in [RemoteType::NUMBER, RemoteType::TIME] {
            let mut a = BindingSet::new(1);
            let mut b = BindingSet::new(1);
            a.bind_null(1, remote_type).unwrap();
            b.bind(1, &NativeValue::Null(remote_type), Some(remote_type)).unwrap();
            assert_eq!(a.current_row().unwrap(), b.current_row().unwrap());

            let decoder = ValueDecoder::default();
            let row = a.current_row().unwrap();
            let wire = &row.rows()[0][0];
            for kind in ValueKind::ALL {
                assert!(decoder.decode_as(wire, kind, None).unwrap().is_null());
            }
        }
    }

    #[test]
    fn test_null_retagged_by_hint() {
        let mut binds = BindingSet::new(1);
        binds
            .bind(1, &NativeValue::Null(RemoteType::NUMBER), Some(RemoteType::TIME))
            .unwrap();
        assert_eq!(binds.shape(), vec![Some(RemoteType::TIME)]);
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_type_mismatch_reports_position() {
        let mut binds = BindingSet::new(3);
        let err = binds
            .bind(
                3,
                &NativeValue::Time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()),
                Some(RemoteType::NUMBER),
            )
            .unwrap_err();
        assert!(err.is_value_error());
        assert!(!err.is_recoverable());
        assert_eq!(err.location(), Some(&Location::Parameter(3)));
        assert_eq!(
            err.to_string(),
            "type mismatch at parameter 3: TIME cannot be bound as NUMBER(38,0)"
        );
        assert!(binds.slots()[2].pending().is_none());
    }

    #[test]
    fn test_out_of_range_reports_position() {
        let mut binds = BindingSet::new(1);
        let err = binds
            .bind(1, &NativeValue::Int(100_000), Some(RemoteType::fixed(4, 0).unwrap()))
            .unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { .. }));
        assert_eq!(err.location(), Some(&Location::Parameter(1)));
    }
}
