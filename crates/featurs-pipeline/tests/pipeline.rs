//! End-to-end tests for pipeline construction and collection.

use featurs_common::column_to_f64;
use featurs_model::{
    ColumnRole, ColumnSpecification, ColumnType, OptimizationLevel, PipelineOptions, Schema,
    Selection, ValidationMode,
};
use featurs_pipeline::{
    AggregationOptions, Dataset, Optimizer, Pipeline, PipelineError, deduplicate_commutative,
    skip_self,
};
use featurs_transform::{
    ArithmeticAggregation, ArithmeticOperation, CountTransformer, CumulativeMode,
    PolynomialTransformer, RowFilter, SeasonalOperation, TimeWindow, Transformer, TransformerKind,
};
use polars::prelude::*;
use proptest::prelude::*;

const START_MS: i64 = 946_684_800_000;
const DAY_MS: i64 = 86_400_000;

fn basic_dataset() -> Dataset {
    let dates: Vec<i64> = (0..6).map(|i| START_MS + i * DAY_MS).collect();
    let frame = df! {
        "NUMERIC_FEATURE" => &[0i64, 1, 2, 3, 4, 5],
        "GROUPING_FEATURE_NUM" => &[0i64, 1, 2, 1, 2, 1],
        "BOOL_FEATURE" => &[true, false, true, false, true, false],
        "TEXT_FEATURE" => &["alice@example.com", "bob", "carol7", "dave", "eve@test.org", "x1y2"],
        "DATE" => &dates,
    }
    .unwrap()
    .lazy()
    .with_columns([col("DATE").cast(DataType::Datetime(TimeUnit::Milliseconds, None))]);
    let schema = Schema::new(vec![
        ColumnSpecification::numeric("NUMERIC_FEATURE"),
        ColumnSpecification::nominal("GROUPING_FEATURE_NUM"),
        ColumnSpecification::boolean("BOOL_FEATURE"),
        ColumnSpecification::text("TEXT_FEATURE"),
        ColumnSpecification::datetime("DATE").with_role(ColumnRole::TimeInfo),
    ])
    .unwrap();
    Dataset::new(frame, schema)
}

fn pair_dataset() -> Dataset {
    let frame = df! {
        "A" => &[1.0, 2.0, 3.0],
        "B" => &[10.0, 20.0, 30.0],
    }
    .unwrap();
    let schema = Schema::new(vec![
        ColumnSpecification::numeric("A"),
        ColumnSpecification::numeric("B"),
    ])
    .unwrap();
    Dataset::from_frame(frame, schema)
}

fn layer_names(pipeline: &Pipeline) -> Vec<String> {
    pipeline.current_layer().iter().map(Transformer::name).collect()
}

fn output_names(pipeline: &Pipeline) -> Vec<String> {
    pipeline.output_columns().into_iter().map(|c| c.name).collect()
}

fn collected(pipeline: &Pipeline, name: &str) -> Vec<f64> {
    let df = pipeline.collect().unwrap();
    column_to_f64(&df, name)
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect()
}

fn with_level(level: OptimizationLevel) -> Pipeline {
    Pipeline::with_options(
        pair_dataset(),
        PipelineOptions::default().with_optimization_level(level),
    )
}

#[test]
fn polynomial_end_to_end() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_polynomial("NUMERIC_FEATURE", &[2], false)
        .unwrap();
    assert_eq!(layer_names(&pipeline), vec!["NUMERIC_FEATURE_pow_2"]);
    assert_eq!(
        collected(&pipeline, "NUMERIC_FEATURE_pow_2"),
        vec![0.0, 1.0, 4.0, 9.0, 16.0, 25.0]
    );
}

#[test]
fn arithmetic_optimization_ladder() {
    let add = [ArithmeticOperation::Add];

    let none = with_level(OptimizationLevel::None)
        .with_arithmetic(ColumnType::Numeric, ColumnType::Numeric, &add, false)
        .unwrap();
    assert_eq!(layer_names(&none), vec!["A_add_A", "A_add_B", "B_add_A", "B_add_B"]);

    let skip = with_level(OptimizationLevel::SkipSelf)
        .with_arithmetic(ColumnType::Numeric, ColumnType::Numeric, &add, false)
        .unwrap();
    assert_eq!(layer_names(&skip), vec!["A_add_B", "B_add_A"]);

    let dedup = with_level(OptimizationLevel::DeduplicateCommutative)
        .with_arithmetic(
            ColumnType::Numeric,
            ColumnType::Numeric,
            &[ArithmeticOperation::Add, ArithmeticOperation::Subtract],
            false,
        )
        .unwrap();
    assert_eq!(
        layer_names(&dedup),
        vec!["A_add_B", "A_subtract_B", "B_subtract_A"]
    );
    assert_eq!(collected(&dedup, "B_subtract_A"), vec![9.0, 18.0, 27.0]);
}

#[test]
fn repeated_operation_is_idempotent() {
    let once = Pipeline::new(basic_dataset())
        .with_polynomial(ColumnType::Numeric, &[2, 3], false)
        .unwrap();
    let twice = once
        .with_polynomial(ColumnType::Numeric, &[2, 3], false)
        .unwrap();
    assert_eq!(output_names(&once), output_names(&twice));
    assert_eq!(twice.current_layer().len(), 2);
}

#[test]
fn outputs_visible_only_after_new_layer() {
    let first = Pipeline::new(basic_dataset())
        .with_polynomial(ColumnType::Numeric, &[2], false)
        .unwrap();

    let same_layer = first
        .with_polynomial(ColumnType::Numeric, &[3], false)
        .unwrap();
    assert_eq!(
        layer_names(&same_layer),
        vec!["NUMERIC_FEATURE_pow_2", "NUMERIC_FEATURE_pow_3"]
    );

    let next_layer = first
        .with_new_layer()
        .unwrap()
        .with_polynomial(ColumnType::Numeric, &[3], false)
        .unwrap();
    assert_eq!(next_layer.layers().len(), 2);
    assert_eq!(
        layer_names(&next_layer),
        vec!["NUMERIC_FEATURE_pow_3", "NUMERIC_FEATURE_pow_2_pow_3"]
    );
    assert_eq!(
        collected(&next_layer, "NUMERIC_FEATURE_pow_2_pow_3"),
        vec![0.0, 1.0, 64.0, 729.0, 4096.0, 15625.0]
    );
}

#[test]
fn auxiliary_columns_are_stripped() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_polynomial("NUMERIC_FEATURE", &[2], true)
        .unwrap()
        .with_new_layer()
        .unwrap()
        .with_polynomial("NUMERIC_FEATURE_pow_2", &[2], false)
        .unwrap();

    assert_eq!(pipeline.auxiliary_columns().len(), 1);
    assert!(!output_names(&pipeline).contains(&"NUMERIC_FEATURE_pow_2".to_string()));

    let df = pipeline.collect().unwrap();
    assert!(df.column("NUMERIC_FEATURE_pow_2").is_err());
    assert_eq!(
        collected(&pipeline, "NUMERIC_FEATURE_pow_2_pow_2"),
        vec![0.0, 1.0, 16.0, 81.0, 256.0, 625.0]
    );
}

#[test]
fn operations_leave_receiver_untouched() {
    let base = Pipeline::new(basic_dataset());
    let extended = base.with_polynomial("NUMERIC_FEATURE", &[2], false).unwrap();

    assert!(base.current_layer().is_empty());
    assert_eq!(extended.current_layer().len(), 1);
    assert_eq!(base.collect().unwrap().width(), 5);
    assert_eq!(extended.collect().unwrap().width(), 6);
}

#[test]
fn count_aggregations() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_count(
            AggregationOptions::new()
                .with_over(Selection::none())
                .with_over("GROUPING_FEATURE_NUM"),
        )
        .unwrap()
        .with_count(
            AggregationOptions::new()
                .with_index_column("DATE")
                .with_time_window(Some(TimeWindow::parse("2d1h").unwrap())),
        )
        .unwrap();

    assert_eq!(
        layer_names(&pipeline),
        vec!["count", "count_over_GROUPING_FEATURE_NUM", "count_in_the_last_2d1h"]
    );
    assert_eq!(collected(&pipeline, "count"), vec![6.0; 6]);
    assert_eq!(
        collected(&pipeline, "count_over_GROUPING_FEATURE_NUM"),
        vec![1.0, 3.0, 2.0, 3.0, 2.0, 3.0]
    );
    assert_eq!(
        collected(&pipeline, "count_in_the_last_2d1h"),
        vec![1.0, 2.0, 3.0, 3.0, 3.0, 3.0]
    );
}

#[test]
fn only_wrapped_aggregations_when_all_options_valid() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_count(AggregationOptions::new().with_over("GROUPING_FEATURE_NUM"))
        .unwrap();
    assert_eq!(layer_names(&pipeline), vec!["count_over_GROUPING_FEATURE_NUM"]);
}

#[test]
fn cumulative_filtered_sums() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_arithmetic_aggregation(
            "NUMERIC_FEATURE",
            &[ArithmeticAggregation::Sum],
            &[],
            AggregationOptions::new()
                .with_cumulative(CumulativeMode::Inclusive)
                .with_filter(RowFilter::new("NOT_BOOL", col("BOOL_FEATURE").not())),
        )
        .unwrap();
    assert_eq!(
        layer_names(&pipeline),
        vec!["NUMERIC_FEATURE_inclusive_cum_sum_where_NOT_BOOL"]
    );
    assert_eq!(
        collected(&pipeline, "NUMERIC_FEATURE_inclusive_cum_sum_where_NOT_BOOL"),
        vec![0.0, 1.0, 1.0, 4.0, 4.0, 9.0]
    );
}

#[test]
fn quantile_levels_expand() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_arithmetic_aggregation(
            "NUMERIC_FEATURE",
            &[
                ArithmeticAggregation::Quantile,
                ArithmeticAggregation::Median,
                ArithmeticAggregation::Mean,
            ],
            &[0.2, 0.8],
            AggregationOptions::new(),
        )
        .unwrap();
    assert_eq!(
        layer_names(&pipeline),
        vec![
            "NUMERIC_FEATURE_quantile_20",
            "NUMERIC_FEATURE_quantile_80",
            "NUMERIC_FEATURE_median",
            "NUMERIC_FEATURE_mean",
        ]
    );
    assert_eq!(collected(&pipeline, "NUMERIC_FEATURE_mean"), vec![2.5; 6]);
}

#[test]
fn close_quantile_levels_are_all_kept() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_arithmetic_aggregation(
            "NUMERIC_FEATURE",
            &[ArithmeticAggregation::Quantile],
            &[0.251, 0.254],
            AggregationOptions::new(),
        )
        .unwrap();
    assert_eq!(
        layer_names(&pipeline),
        vec!["NUMERIC_FEATURE_quantile_25.1", "NUMERIC_FEATURE_quantile_25.4"]
    );
}

#[test]
fn generated_names_snapshot() {
    let pipeline = Pipeline::new(basic_dataset())
        .with_polynomial("NUMERIC_FEATURE", &[2], false)
        .unwrap()
        .with_seasonal(
            "DATE",
            &[SeasonalOperation::DayOfWeek],
            false,
        )
        .unwrap()
        .with_lagged(
            "NUMERIC_FEATURE",
            &[1],
            None,
            AggregationOptions::new().with_over("GROUPING_FEATURE_NUM"),
        )
        .unwrap()
        .with_num_unique(
            "GROUPING_FEATURE_NUM",
            AggregationOptions::new().with_cumulative(CumulativeMode::Exclusive),
        )
        .unwrap();

    insta::assert_json_snapshot!(layer_names(&pipeline), @r#"
    [
      "NUMERIC_FEATURE_pow_2",
      "DATE_day_of_week",
      "NUMERIC_FEATURE_lagged_1_over_GROUPING_FEATURE_NUM",
      "GROUPING_FEATURE_NUM_exclusive_cum_num_unique"
    ]
    "#);
}

#[test]
fn warn_mode_skips_contract_violations() {
    let lenient = Pipeline::with_options(
        basic_dataset(),
        PipelineOptions::default().with_validation_mode(ValidationMode::Warn),
    );
    let pipeline = lenient
        .with_polynomial(vec!["TEXT_FEATURE", "NUMERIC_FEATURE"], &[2], false)
        .unwrap();
    assert_eq!(layer_names(&pipeline), vec!["NUMERIC_FEATURE_pow_2"]);

    let err = Pipeline::new(basic_dataset())
        .with_polynomial("TEXT_FEATURE", &[2], false)
        .unwrap_err();
    assert!(matches!(err, PipelineError::TypeContract { ref column, .. } if column == "TEXT_FEATURE"));
}

#[test]
fn empty_parameter_lists_are_rejected() {
    let pipeline = Pipeline::new(basic_dataset());
    assert!(matches!(
        pipeline.with_polynomial("NUMERIC_FEATURE", &[], false),
        Err(PipelineError::Construction { .. })
    ));
    assert!(matches!(
        pipeline.with_scaling("NUMERIC_FEATURE", &[], false),
        Err(PipelineError::Construction { .. })
    ));
    assert!(matches!(
        pipeline.with_arithmetic_aggregation(
            "NUMERIC_FEATURE",
            &[ArithmeticAggregation::Quantile],
            &[],
            AggregationOptions::new(),
        ),
        Err(PipelineError::Construction { .. })
    ));
}

#[test]
fn unknown_columns_are_rejected() {
    let err = Pipeline::new(basic_dataset())
        .with_polynomial("MISSING", &[2], false)
        .unwrap_err();
    assert!(matches!(err, PipelineError::Selection(_)));
}

#[test]
fn invalid_aggregation_options() {
    let pipeline = Pipeline::new(basic_dataset());
    let window = Some(TimeWindow::parse("2d").unwrap());

    let err = pipeline
        .with_count(AggregationOptions::new().with_time_window(window.clone()))
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration { .. }));

    let err = pipeline
        .with_count(
            AggregationOptions::new()
                .with_index_column("NUMERIC_FEATURE")
                .with_time_window(window.clone()),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration { .. }));

    let err = pipeline
        .with_lagged(
            "NUMERIC_FEATURE",
            &[1],
            None,
            AggregationOptions::new()
                .with_index_column("DATE")
                .with_time_window(window),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration { .. }));

    let err = pipeline
        .with_first_value(
            "NUMERIC_FEATURE",
            AggregationOptions::new().with_cumulative(CumulativeMode::Inclusive),
        )
        .unwrap_err();
    assert!(matches!(err, PipelineError::Configuration { .. }));
}

#[test]
fn prebuilt_transformers_and_layers() {
    let square = Transformer::leaf(PolynomialTransformer::new(
        ColumnSpecification::numeric("A"),
        2,
    ));
    let count = Transformer::leaf(CountTransformer::default());

    let pipeline = Pipeline::new(pair_dataset())
        .with_transformers(vec![square.clone(), count.clone(), square.clone()], false);
    assert_eq!(layer_names(&pipeline), vec!["A_pow_2", "count"]);

    let layered = Pipeline::from_layers(
        pair_dataset(),
        vec![vec![square], vec![count]],
        PipelineOptions::default(),
    )
    .unwrap();
    assert_eq!(layered.layers().len(), 2);
    assert!(layered.schema().column("A_pow_2").is_some());
    assert_eq!(collected(&layered, "A_pow_2"), vec![1.0, 4.0, 9.0]);
    assert_eq!(collected(&layered, "count"), vec![3.0; 3]);
}

#[test]
fn options_from_toml() {
    let options = PipelineOptions::from_toml_str(
        "optimization_level = \"deduplicate_commutative\"\nvalidation_mode = \"warn\"\n",
    )
    .unwrap();
    let pipeline = Pipeline::with_options(pair_dataset(), options);
    assert_eq!(
        pipeline.optimization_level(),
        OptimizationLevel::DeduplicateCommutative
    );
    assert_eq!(pipeline.options().validation_mode, ValidationMode::Warn);
}

fn column_strategy() -> impl Strategy<Value = ColumnSpecification> {
    prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(ColumnSpecification::numeric)
}

fn combinations_strategy() -> impl Strategy<Value = Vec<Vec<ColumnSpecification>>> {
    prop::collection::vec(prop::collection::vec(column_strategy(), 2), 0..16)
}

proptest! {
    #[test]
    fn skip_self_leaves_distinct_positions(combinations in combinations_strategy()) {
        for combination in skip_self(combinations) {
            prop_assert_ne!(&combination[0], &combination[1]);
        }
    }

    #[test]
    fn commutative_dedup_keeps_one_ordering(combinations in combinations_strategy()) {
        let kept = deduplicate_commutative(combinations.clone());
        let mut canonical: Vec<Vec<String>> = kept
            .iter()
            .map(|c| {
                let mut names: Vec<String> = c.iter().map(|s| s.name.clone()).collect();
                names.sort();
                names
            })
            .collect();
        let before = canonical.len();
        canonical.sort();
        canonical.dedup();
        prop_assert_eq!(canonical.len(), before);
        for combination in &kept {
            prop_assert!(combinations.contains(combination));
        }
    }

    #[test]
    fn higher_levels_prune_more(combinations in combinations_strategy()) {
        let kind = TransformerKind::Arithmetic(ArithmeticOperation::Multiply);
        let none = Optimizer::new(OptimizationLevel::None)
            .optimize_input_columns(kind, combinations.clone());
        let skip = Optimizer::new(OptimizationLevel::SkipSelf)
            .optimize_input_columns(kind, combinations.clone());
        let dedup = Optimizer::new(OptimizationLevel::DeduplicateCommutative)
            .optimize_input_columns(kind, combinations.clone());
        prop_assert_eq!(none, combinations);
        prop_assert!(dedup.len() <= skip.len());
        for combination in &dedup {
            prop_assert!(skip.contains(combination));
        }
    }
}
