//! Tests for plan comparison

use super::comparator::{CompareConfig, PlanComparator, compare};
use super::diff::{Difference, Verdict};
use crate::explain::{JoinType, OpType, Plan, TaskType, parse_text};

const BORDER: &str = "+----------------------+----------+-----------+---------------+---------------+";
const HEADER: &str = "| id | estRows | task | access object | operator info |";

fn v4_report(body: &[&str]) -> String {
    let mut lines = vec![BORDER, HEADER, BORDER];
    lines.extend_from_slice(body);
    lines.push(BORDER);
    lines.join("\n")
}

fn plan(sql: &str, body: &[&str]) -> Plan {
    parse_text(sql, &v4_report(body)).unwrap()
}

const JOIN_BODY: &[&str] = &[
    "| HashJoin_7 | 12487.50 | root | | inner join, equal:[eq(t1.a, t2.a)] |",
    "| ├─TableReader_10(Build) | 9990.00 | root | | data:Selection_9 |",
    "| │ └─Selection_9 | 9990.00 | cop[tikv] | | not(isnull(t2.a)) |",
    "| │   └─TableFullScan_8 | 10000.00 | cop[tikv] | table:t2 | keep order:false |",
    "| └─TableReader_13(Probe) | 9990.00 | root | | data:Selection_12 |",
    "|   └─Selection_12 | 9990.00 | cop[tikv] | | not(isnull(t1.a)) |",
    "|     └─TableFullScan_11 | 10000.00 | cop[tikv] | table:t1 | keep order:false |",
];

const SQL: &str = "select * from t1 join t2 on t1.a = t2.a";

mod verdicts {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_reports_are_same() {
        let p1 = plan(SQL, JOIN_BODY);
        let p2 = plan(SQL, JOIN_BODY);

        let verdict = compare(&p1, &p2);
        assert_eq!(verdict, Verdict::Same);
        assert!(verdict.is_same());
        assert_eq!(verdict.reason(), "");
        assert_eq!(verdict.into_parts(), (String::new(), true));
    }

    #[test]
    fn test_sql_mismatch_skips_traversal() {
        let p1 = plan(SQL, JOIN_BODY);
        let p2 = plan("select * from t1", &["| Point_Get_1 | 1.00 | root | table:t1 | handle:1 |"]);

        let verdict = compare(&p1, &p2);
        assert!(!verdict.is_same());
        assert!(matches!(
            verdict.difference(),
            Some(Difference::SqlText { .. })
        ));
        assert_eq!(verdict.reason(), "differing SQL text");
    }

    #[test]
    fn test_sql_normalization_applies_before_compare() {
        let p1 = plan(&format!("  {};\n", SQL), JOIN_BODY);
        let p2 = plan(SQL, JOIN_BODY);
        assert!(compare(&p1, &p2).is_same());
    }

    #[test]
    fn test_estimates_are_not_compared() {
        let mut body = JOIN_BODY.to_vec();
        body[0] = "| HashJoin_7 | 1.00 | root | | inner join, equal:[eq(t1.a, t2.a)] |";
        assert!(compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body)).is_same());
    }
}

mod differences {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_renamed_table_on_leaf() {
        let mut body = JOIN_BODY.to_vec();
        body[6] = "|     └─TableFullScan_11 | 10000.00 | cop[tikv] | table:t3 | keep order:false |";

        let verdict = compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body));
        assert_eq!(
            verdict,
            Verdict::Different(Difference::Table {
                left_id: "TableFullScan_11".to_string(),
                right_id: "TableFullScan_11".to_string(),
                left: "t1".to_string(),
                right: "t3".to_string(),
            })
        );

        let reason = verdict.reason();
        assert!(reason.contains("TableFullScan_11"));
        assert!(reason.contains("t1"));
        assert!(reason.contains("t3"));
    }

    #[test]
    fn test_missing_operator_reports_type_mismatch() {
        // The probe side loses its Selection
        let body = [
            JOIN_BODY[0],
            JOIN_BODY[1],
            JOIN_BODY[2],
            JOIN_BODY[3],
            "| └─TableReader_13(Probe) | 9990.00 | root | | data:TableFullScan_11 |",
            "|   └─TableFullScan_11 | 10000.00 | cop[tikv] | table:t1 | keep order:false |",
        ];

        let verdict = compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body));
        assert_eq!(
            verdict.difference(),
            Some(&Difference::OperatorType {
                left_id: "Selection_12".to_string(),
                right_id: "TableFullScan_11".to_string(),
                left: OpType::Selection,
                right: OpType::TableScan,
            })
        );
    }

    #[test]
    fn test_extra_child_reports_first_differing_ancestor() {
        let body = [
            "| Projection_4 | 10.00 | root | | t.a |",
            "| └─TableReader_6 | 10.00 | root | | data:TableFullScan_5 |",
            "|   └─TableFullScan_5 | 10.00 | cop[tikv] | table:t | keep order:false |",
        ];
        let deeper = [
            "| Projection_4 | 10.00 | root | | t.a |",
            "| └─Projection_8 | 10.00 | root | | t.a |",
            "|   └─TableReader_6 | 10.00 | root | | data:TableFullScan_5 |",
            "|     └─TableFullScan_5 | 10.00 | cop[tikv] | table:t | keep order:false |",
        ];
        let with_sibling = [
            "| Projection_4 | 10.00 | root | | t.a |",
            "| └─TableReader_6 | 10.00 | root | | data:TableFullScan_5 |",
            "|   ├─TableFullScan_5 | 10.00 | cop[tikv] | table:t | keep order:false |",
            "|   └─TableFullScan_7 | 10.00 | cop[tikv] | table:t | keep order:false |",
        ];

        let verdict = compare(&plan("q", &body), &plan("q", &deeper));
        assert!(matches!(
            verdict.difference(),
            Some(Difference::OperatorType { .. })
        ));

        let verdict = compare(&plan("q", &body), &plan("q", &with_sibling));
        assert_eq!(
            verdict.difference(),
            Some(&Difference::ChildCount {
                left_id: "TableReader_6".to_string(),
                right_id: "TableReader_6".to_string(),
                left: 1,
                right: 2,
            })
        );
        assert!(verdict.reason().contains("different children lengths"));
    }

    #[test]
    fn test_deeper_subtree_reports_child_count() {
        let body = [
            "| Projection_4 | 10.00 | root | | t.a |",
            "| └─TableReader_6 | 10.00 | root | | data:TableFullScan_5 |",
            "|   └─TableFullScan_5 | 10.00 | cop[tikv] | table:t | keep order:false |",
        ];
        let deeper = [
            "| Projection_4 | 10.00 | root | | t.a |",
            "| └─TableReader_6 | 10.00 | root | | data:TableFullScan_5 |",
            "|   └─TableFullScan_5 | 10.00 | cop[tikv] | table:t | keep order:false |",
            "|     └─Selection_9 | 10.00 | cop[tikv] | | gt(t.a, 1) |",
        ];

        let verdict = compare(&plan("q", &body), &plan("q", &deeper));
        assert_eq!(
            verdict.reason(),
            "TableFullScan_5 and TableFullScan_5 have different children lengths: 0 vs 1"
        );
    }

    #[test]
    fn test_difference_names_the_differing_operators() {
        let mut body = JOIN_BODY.to_vec();
        body[6] = "|     └─TableFullScan_11 | 10000.00 | cop[tikv] | table:t3 | keep order:false |";

        let verdict = compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body));
        assert_eq!(
            verdict.difference().and_then(|d| d.operator_ids()),
            Some(("TableFullScan_11", "TableFullScan_11"))
        );

        let verdict = compare(&plan(SQL, JOIN_BODY), &plan("select 1", JOIN_BODY));
        assert_eq!(verdict.difference().and_then(|d| d.operator_ids()), None);
    }

    #[test]
    fn test_task_location_mismatch() {
        let mut body = JOIN_BODY.to_vec();
        body[6] = "|     └─TableFullScan_11 | 10000.00 | cop[tiflash] | table:t1 | keep order:false |";

        let verdict = compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body));
        assert_eq!(
            verdict.difference(),
            Some(&Difference::TaskLocation {
                left_id: "TableFullScan_11".to_string(),
                right_id: "TableFullScan_11".to_string(),
                left: TaskType::StorageEngine,
                right: TaskType::ColumnarEngine,
            })
        );

        let comparator =
            PlanComparator::with_config(CompareConfig::new().without_task_locations());
        assert!(comparator.compare(&plan(SQL, JOIN_BODY), &plan(SQL, &body)).is_same());
    }

    #[test]
    fn test_index_mismatch() {
        let left = [
            "| IndexReader_6 | 10.00 | root | | index:IndexRangeScan_5 |",
            "| └─IndexRangeScan_5 | 10.00 | cop[tikv] | table:t, index:idx_a(a) | range:[1,1] |",
        ];
        let right = [
            "| IndexReader_6 | 10.00 | root | | index:IndexRangeScan_5 |",
            "| └─IndexRangeScan_5 | 10.00 | cop[tikv] | table:t, index:idx_ab(a, b) | range:[1,1] |",
        ];

        let verdict = compare(&plan("q", &left), &plan("q", &right));
        assert_eq!(
            verdict.difference(),
            Some(&Difference::Index {
                left_id: "IndexRangeScan_5".to_string(),
                right_id: "IndexRangeScan_5".to_string(),
                left: "idx_a".to_string(),
                right: "idx_ab".to_string(),
            })
        );
        assert!(verdict.reason().contains("idx_ab"));
    }
}

mod config {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = CompareConfig::default();
        assert!(config.compare_sql);
        assert!(config.compare_task_locations);
        assert!(!config.compare_join_types);
        assert_eq!(PlanComparator::new().config(), &config);
    }

    #[test]
    fn test_without_sql() {
        let p1 = plan(SQL, JOIN_BODY);
        let p2 = plan("select * from t2 join t1 on t1.a = t2.a", JOIN_BODY);

        assert!(!compare(&p1, &p2).is_same());

        let comparator = PlanComparator::with_config(CompareConfig::new().without_sql());
        assert!(comparator.compare(&p1, &p2).is_same());
    }

    #[test]
    fn test_join_types_only_when_enabled() {
        let mut body = JOIN_BODY.to_vec();
        body[0] = "| HashJoin_7 | 12487.50 | root | | left outer join, equal:[eq(t1.a, t2.a)] |";
        let p1 = plan(SQL, JOIN_BODY);
        let p2 = plan(SQL, &body);

        assert!(compare(&p1, &p2).is_same());

        let comparator = PlanComparator::with_config(CompareConfig::new().with_join_types());
        let verdict = comparator.compare(&p1, &p2);
        assert_eq!(
            verdict.difference(),
            Some(&Difference::JoinType {
                left_id: "HashJoin_7".to_string(),
                right_id: "HashJoin_7".to_string(),
                left: Some(JoinType::Inner),
                right: Some(JoinType::LeftOuter),
            })
        );
        assert_eq!(
            verdict.reason(),
            "HashJoin_7 and HashJoin_7 have different join types: inner join vs left outer join"
        );
    }

    #[test]
    fn test_compare_operators_directly() {
        let p1 = plan(SQL, JOIN_BODY);
        let p2 = plan("other", JOIN_BODY);
        let comparator = PlanComparator::new();

        assert!(comparator.compare_operators(p1.root(), p2.root()).is_same());
        let verdict = comparator.compare_operators(&p1.root().children()[0], p2.root());
        assert!(!verdict.is_same());
    }
}
