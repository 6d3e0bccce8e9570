#[cfg(test)]
mod tests {
    use weft::error::WeftError;
    use weft::io::MemoryTable;
    use weft::read::FieldMatchingStrategy;
    use weft::scalar::ValueErrorMode;
    use weft::{ReadOptions, ReadPlan, ReadPolicy, ReadSession, RecordWriter, WriteOptions, record_model};

    record_model! {
        #[derive(Debug, Clone, PartialEq)]
        struct Stored {
            id: i32,
            full_name: Option<String>,
            score: i64,
            ratio: f32,
        }
    }

    record_model! {
        #[allow(non_snake_case)]
        #[derive(Debug, Clone, PartialEq)]
        struct Evolved {
            id: i64,
            email: Option<String>,
            fullName: Option<String>,
            score: Option<i32>,
            ratio: f64,
        }
    }

    record_model! {
        #[derive(Debug, Clone, PartialEq)]
        struct WithAge {
            id: i64,
            age: i32,
        }
    }

    record_model! {
        #[derive(Debug, Clone, PartialEq)]
        struct Widened {
            id: f64,
            score: i64,
            ratio: f64,
        }
    }

    fn table(scores: &[i64]) -> MemoryTable {
        let rows = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Stored {
                id: i32::try_from(i).unwrap(),
                full_name: Some(format!("user {i}")),
                score,
                ratio: 0.5,
            })
            .collect::<Vec<_>>();
        let mut writer =
            RecordWriter::<Stored, _>::for_type(MemoryTable::new(), WriteOptions::default()).unwrap();
        writer.write_all(&rows).unwrap();
        writer.close().unwrap()
    }

    fn options(policy: ReadPolicy) -> ReadOptions {
        ReadOptions::default().with_policy(policy)
    }

    #[test]
    fn widening_is_always_allowed() {
        let mut session =
            ReadSession::for_type::<Widened>(table(&[10, 20]), &ReadOptions::default()).unwrap();
        assert_eq!(
            session.next_as::<Widened>().unwrap(),
            Some(Widened {
                id: 0.0,
                score: 10,
                ratio: 0.5,
            })
        );
    }

    #[test]
    fn missing_nullable_column_follows_the_policy() {
        let err = ReadSession::for_type::<Evolved>(table(&[1]), &ReadOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, WeftError::MissingColumn(..)));

        let strict = ReadPolicy::default()
            .with_fail_on_missing_column(false)
            .with_fail_narrowing_primitive_conversion(false)
            .with_field_matching(FieldMatchingStrategy::Strict);
        let err = ReadSession::for_type::<Evolved>(table(&[1]), &options(strict))
            .err()
            .unwrap();
        assert!(matches!(err, WeftError::MissingColumn(..)));
    }

    #[test]
    fn missing_required_column_always_fails() {
        let lenient = ReadPolicy::default().with_fail_on_missing_column(false);
        let err = ReadSession::for_type::<WithAge>(table(&[1]), &options(lenient))
            .err()
            .unwrap();
        assert!(matches!(err, WeftError::MissingColumn(..)));
    }

    #[test]
    fn narrowing_at_build_time() {
        let policy = ReadPolicy::default().with_fail_on_missing_column(false);
        let stored = table(&[1]);
        let err = ReadPlan::for_type::<Evolved>(weft::io::RecordSource::schema(&stored), &options(policy))
            .unwrap_err();
        assert!(matches!(err, WeftError::NarrowingConversion(..)));
    }

    #[test]
    fn deferred_narrowing_and_best_effort_names() {
        let policy = ReadPolicy::default()
            .with_fail_on_missing_column(false)
            .with_fail_narrowing_primitive_conversion(false);
        let mut session =
            ReadSession::for_type::<Evolved>(table(&[42, i64::MAX]), &options(policy)).unwrap();
        assert_eq!(
            session.plan().to_string(),
            "{id<-[0] widen(i64), email<-null, fullName<-[1] identity, score<-[2] narrow(i32), \
             ratio<-[3] widen(f64)}"
        );
        assert_eq!(
            session.next_as::<Evolved>().unwrap(),
            Some(Evolved {
                id: 0,
                email: None,
                fullName: Some("user 0".to_string()),
                score: Some(42),
                ratio: 0.5,
            })
        );
        let err = session.next_as::<Evolved>().unwrap_err();
        assert!(matches!(err.root(), WeftError::NarrowingConversion(..)));
        assert!(session.is_closed());
    }

    #[test]
    fn lenient_values() {
        let policy = ReadPolicy::default()
            .with_fail_on_missing_column(false)
            .with_fail_narrowing_primitive_conversion(false)
            .with_value_errors(ValueErrorMode::NullOnError);
        let session = ReadSession::for_type::<Evolved>(table(&[1, i64::MAX]), &options(policy)).unwrap();
        let scores = session
            .map(|record| record.unwrap().get("score").cloned())
            .collect::<Vec<_>>();
        assert_eq!(
            scores,
            vec![Some(weft::Value::from(1i32)), Some(weft::Value::Null)]
        );
    }
}
