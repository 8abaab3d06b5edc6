//! Layered, immutable feature pipeline.
//!
//! Every operation resolves its column selections against the frozen schema,
//! expands the cartesian product of columns and parameters, prunes it with the
//! [`Optimizer`], validates the resulting transformers and appends the
//! survivors to the current layer. Nothing is computed until
//! [`Pipeline::collect`].

use std::sync::Arc;

use polars::prelude::{DataFrame, Expr};
use tracing::{debug, info};

use featurs_common::{cartesian_product, order_preserving_unique, valid_param_options};
use featurs_model::{ColumnSpecification, OptimizationLevel, PipelineOptions, Schema, Selection};
use featurs_transform::{
    ArithmeticAggregation, ArithmeticAggregationTransformer, ArithmeticOperation,
    ArithmeticTransformer, Comparison, ComparisonTransformer, CountTransformer, CumulativeMode,
    EntityEntropyTransformer, FirstValueTransformer, GoniometricFunction, GoniometricTransformer,
    LaggedTransformer, LogTransformer, ModeTransformer, NumUniqueTransformer, Over,
    PointwiseMutualInformationTransformer, PolynomialTransformer, Rolling, RowFilter, Scaling,
    ScalingTransformer, SeasonalOperation, SeasonalTransformer, TextCountMatchesTransformer,
    TextExtraction, TextExtractionTransformer, TextPattern, TextSimilarity,
    TextSimilarityTransformer, TimeDiffTransformer, TimeDiffUnit, TimeWindow, Transformer,
    TransformerKind,
};

use crate::dataset::Dataset;
use crate::error::{PipelineError, Result};
use crate::optimizer::Optimizer;
use crate::validator::Validator;

/// Transformers evaluated against one frozen schema.
pub type Layer = Arc<[Transformer]>;

/// Scoping and bookkeeping shared by the aggregating operations.
///
/// Empty key lists in `over_columns_combinations` and `None` entries in
/// `time_windows` keep the unwrapped aggregation next to the wrapped ones.
#[derive(Debug, Clone, Default)]
pub struct AggregationOptions {
    pub over_columns_combinations: Vec<Selection>,
    pub time_windows: Vec<Option<TimeWindow>>,
    pub index_column: Option<String>,
    pub cumulative: CumulativeMode,
    pub filter: Option<RowFilter>,
    pub auxiliary: bool,
}

impl AggregationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one combination of group keys.
    pub fn with_over(mut self, keys: impl Into<Selection>) -> Self {
        self.over_columns_combinations.push(keys.into());
        self
    }

    /// Adds a window; `None` keeps the unwindowed aggregation.
    pub fn with_time_window(mut self, window: Option<TimeWindow>) -> Self {
        self.time_windows.push(window);
        self
    }

    pub fn with_index_column(mut self, name: impl Into<String>) -> Self {
        self.index_column = Some(name.into());
        self
    }

    pub fn with_cumulative(mut self, cumulative: CumulativeMode) -> Self {
        self.cumulative = cumulative;
        self
    }

    pub fn with_filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_auxiliary(mut self, auxiliary: bool) -> Self {
        self.auxiliary = auxiliary;
        self
    }

    fn reject_time_windows(&self, operation: &str) -> Result<()> {
        if self.time_windows.iter().any(Option::is_some) {
            return Err(PipelineError::Configuration {
                message: format!("{operation} does not support time windows"),
            });
        }
        Ok(())
    }

    fn reject_cumulative(&self, operation: &str) -> Result<()> {
        if self.cumulative.is_cumulative() {
            return Err(PipelineError::Configuration {
                message: format!("{operation} does not support cumulative aggregation"),
            });
        }
        Ok(())
    }

    fn reject_filter(&self, operation: &str) -> Result<()> {
        if self.filter.is_some() {
            return Err(PipelineError::Configuration {
                message: format!("{operation} does not support row filters"),
            });
        }
        Ok(())
    }
}

/// A declarative, layered feature pipeline.
///
/// Every operation returns a new pipeline; the receiver stays valid and
/// shares its layers with the result.
#[derive(Debug, Clone)]
pub struct Pipeline {
    dataset: Dataset,
    layers: Vec<Layer>,
    options: PipelineOptions,
    auxiliary_columns: Vec<ColumnSpecification>,
}

impl Pipeline {
    pub fn new(dataset: Dataset) -> Self {
        Self::with_options(dataset, PipelineOptions::default())
    }

    pub fn with_options(dataset: Dataset, options: PipelineOptions) -> Self {
        Self {
            dataset,
            layers: vec![Vec::new().into()],
            options,
            auxiliary_columns: Vec::new(),
        }
    }

    /// Builds a pipeline from pre-built layers; every layer but the last is
    /// frozen into the schema.
    ///
    /// # Errors
    ///
    /// Fails when two layers produce the same column name.
    pub fn from_layers(
        dataset: Dataset,
        layers: Vec<Vec<Transformer>>,
        options: PipelineOptions,
    ) -> Result<Self> {
        let mut layers: Vec<Layer> = layers.into_iter().map(Layer::from).collect();
        if layers.is_empty() {
            layers.push(Vec::new().into());
        }
        let mut dataset = dataset;
        for layer in &layers[..layers.len() - 1] {
            dataset = dataset.with_schema(&layer_schema(layer)?)?;
        }
        Ok(Self {
            dataset,
            layers,
            options,
            auxiliary_columns: Vec::new(),
        })
    }

    // === Accessors ===

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Columns visible to operations: the input plus all frozen layers.
    pub fn schema(&self) -> &Schema {
        self.dataset.schema()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn current_layer(&self) -> &[Transformer] {
        match self.layers.last() {
            Some(layer) => layer,
            None => &[],
        }
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    pub fn optimization_level(&self) -> OptimizationLevel {
        self.options.optimization_level
    }

    pub fn auxiliary_columns(&self) -> &[ColumnSpecification] {
        &self.auxiliary_columns
    }

    /// Columns of the collected result, auxiliary columns excluded.
    pub fn output_columns(&self) -> Vec<ColumnSpecification> {
        self.schema()
            .iter()
            .cloned()
            .chain(
                self.current_layer()
                    .iter()
                    .map(Transformer::output_column_specification),
            )
            .filter(|column| !self.auxiliary_columns.contains(column))
            .collect()
    }

    // === Row-wise operations ===

    /// # Errors
    ///
    /// Fails on an unknown column, an empty degree list or a type mismatch.
    pub fn with_polynomial(
        &self,
        subset: impl Into<Selection>,
        degrees: &[i32],
        auxiliary: bool,
    ) -> Result<Self> {
        require_non_empty("polynomial", "degrees", degrees)?;
        let input = self.resolve_inputs(vec![subset.into()])?;
        let degrees = order_preserving_unique(degrees.iter().copied());
        let transformers = self.build_transformers(
            &input,
            &[()],
            &degrees,
            |_| TransformerKind::Polynomial,
            |_, columns, degree| {
                Ok(Transformer::leaf(PolynomialTransformer::new(
                    columns[0].clone(),
                    *degree,
                )))
            },
        )?;
        Ok(self.with_added_to_current_layer(transformers, auxiliary))
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty base list or a type mismatch.
    pub fn with_log(
        &self,
        subset: impl Into<Selection>,
        bases: &[f64],
        auxiliary: bool,
    ) -> Result<Self> {
        require_non_empty("log", "bases", bases)?;
        let input = self.resolve_inputs(vec![subset.into()])?;
        let transformers = self.build_transformers(
            &input,
            &[()],
            bases,
            |_| TransformerKind::Log,
            |_, columns, base| Ok(Transformer::leaf(LogTransformer::new(columns[0].clone(), *base))),
        )?;
        Ok(self.with_added_to_current_layer(transformers, auxiliary))
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty function list or a type mismatch.
    pub fn with_goniometric(
        &self,
        subset: impl Into<Selection>,
        functions: &[GoniometricFunction],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_unary_operations(
            "goniometric",
            subset.into(),
            functions,
            |f| TransformerKind::Goniometric(*f),
            |f, column| Ok(Transformer::leaf(GoniometricTransformer::new(column, *f))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty scaling list or a type mismatch.
    pub fn with_scaling(
        &self,
        subset: impl Into<Selection>,
        scalings: &[Scaling],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_unary_operations(
            "scaling",
            subset.into(),
            scalings,
            |s| TransformerKind::Scaling(*s),
            |s, column| Ok(Transformer::leaf(ScalingTransformer::new(column, *s))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty operation list or a type mismatch.
    pub fn with_arithmetic(
        &self,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        operations: &[ArithmeticOperation],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_binary_operations(
            "arithmetic",
            left.into(),
            right.into(),
            operations,
            |op| TransformerKind::Arithmetic(*op),
            |op, l, r| Ok(Transformer::leaf(ArithmeticTransformer::new(l, r, *op))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column or an empty comparison list.
    pub fn with_comparison(
        &self,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        comparisons: &[Comparison],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_binary_operations(
            "comparison",
            left.into(),
            right.into(),
            comparisons,
            |c| TransformerKind::Comparison(*c),
            |c, l, r| Ok(Transformer::leaf(ComparisonTransformer::new(l, r, *c))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty operation list or a type mismatch.
    pub fn with_seasonal(
        &self,
        subset: impl Into<Selection>,
        operations: &[SeasonalOperation],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_unary_operations(
            "seasonal",
            subset.into(),
            operations,
            |op| TransformerKind::Seasonal(*op),
            |op, column| Ok(Transformer::leaf(SeasonalTransformer::new(column, *op))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty unit list or a type mismatch.
    pub fn with_time_diff(
        &self,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        units: &[TimeDiffUnit],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_binary_operations(
            "time difference",
            left.into(),
            right.into(),
            units,
            |_| TransformerKind::TimeDiff,
            |unit, l, r| Ok(Transformer::leaf(TimeDiffTransformer::new(l, r, *unit))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty similarity list or a type mismatch.
    pub fn with_text_similarity(
        &self,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        similarities: &[TextSimilarity],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_binary_operations(
            "text similarity",
            left.into(),
            right.into(),
            similarities,
            |s| TransformerKind::TextSimilarity(*s),
            |s, l, r| Ok(Transformer::leaf(TextSimilarityTransformer::new(l, r, *s))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty extraction list or a type mismatch.
    pub fn with_text_extraction(
        &self,
        subset: impl Into<Selection>,
        extractions: &[TextExtraction],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_unary_operations(
            "text extraction",
            subset.into(),
            extractions,
            |e| TransformerKind::TextExtraction(*e),
            |e, column| Ok(Transformer::leaf(TextExtractionTransformer::new(column, *e))),
            auxiliary,
        )
    }

    /// # Errors
    ///
    /// Fails on an unknown column, an empty or invalid pattern list or a type
    /// mismatch.
    pub fn with_text_count_matches(
        &self,
        subset: impl Into<Selection>,
        patterns: &[TextPattern],
        auxiliary: bool,
    ) -> Result<Self> {
        self.with_unary_operations(
            "text count matches",
            subset.into(),
            patterns,
            |_| TransformerKind::TextCountMatches,
            |pattern, column| {
                Ok(Transformer::leaf(TextCountMatchesTransformer::new(
                    column,
                    pattern.clone(),
                )?))
            },
            auxiliary,
        )
    }

    // === Aggregating operations ===

    /// # Errors
    ///
    /// Fails on unknown key or index columns, or an unusable index column.
    pub fn with_count(&self, options: AggregationOptions) -> Result<Self> {
        let index_column = self.index_column(&options)?;
        let counts = self.build_transformers(
            &[],
            &[()],
            &[()],
            |_| TransformerKind::Count,
            |_, _, _| {
                Ok(Transformer::leaf(CountTransformer::new(
                    options.cumulative,
                    options.filter.clone(),
                )))
            },
        )?;
        self.with_aggregations(counts, index_column, &options)
    }

    /// Lagged values, optionally within groups. Time windows, cumulative
    /// modes and filters are rejected.
    ///
    /// # Errors
    ///
    /// Fails on an unknown column, an empty lag list or unsupported options.
    pub fn with_lagged(
        &self,
        subset: impl Into<Selection>,
        lags: &[i64],
        fill_value: Option<Expr>,
        options: AggregationOptions,
    ) -> Result<Self> {
        require_non_empty("lagged", "lags", lags)?;
        options.reject_time_windows("lagged")?;
        options.reject_cumulative("lagged")?;
        options.reject_filter("lagged")?;
        let input = self.resolve_inputs(vec![subset.into()])?;
        let lags = order_preserving_unique(lags.iter().copied());
        let lagged = self.build_transformers(
            &input,
            &[()],
            &lags,
            |_| TransformerKind::Lagged,
            |_, columns, lag| {
                Ok(Transformer::leaf(LaggedTransformer::new(
                    columns[0].clone(),
                    *lag,
                    fill_value.clone(),
                )))
            },
        )?;
        self.with_aggregations(lagged, None, &options)
    }

    /// # Errors
    ///
    /// Fails on unknown columns, a cumulative mode or an unusable index column.
    pub fn with_first_value(
        &self,
        subset: impl Into<Selection>,
        options: AggregationOptions,
    ) -> Result<Self> {
        options.reject_cumulative("first value")?;
        self.with_unary_aggregation(subset.into(), TransformerKind::FirstValue, options, |c, o| {
            Transformer::leaf(FirstValueTransformer::new(c, o.filter.clone()))
        })
    }

    /// # Errors
    ///
    /// Fails on unknown columns or an unusable index column.
    pub fn with_mode(&self, subset: impl Into<Selection>, options: AggregationOptions) -> Result<Self> {
        self.with_unary_aggregation(subset.into(), TransformerKind::Mode, options, |c, o| {
            Transformer::leaf(ModeTransformer::new(c, o.cumulative, o.filter.clone()))
        })
    }

    /// # Errors
    ///
    /// Fails on unknown columns or an unusable index column.
    pub fn with_num_unique(
        &self,
        subset: impl Into<Selection>,
        options: AggregationOptions,
    ) -> Result<Self> {
        self.with_unary_aggregation(subset.into(), TransformerKind::NumUnique, options, |c, o| {
            Transformer::leaf(NumUniqueTransformer::new(c, o.cumulative, o.filter.clone()))
        })
    }

    /// Arithmetic aggregations; `quantiles` lists the levels used by
    /// [`ArithmeticAggregation::Quantile`].
    ///
    /// # Errors
    ///
    /// Fails on unknown columns, an empty aggregation list, a quantile
    /// aggregation without levels, or an unusable index column.
    pub fn with_arithmetic_aggregation(
        &self,
        subset: impl Into<Selection>,
        aggregations: &[ArithmeticAggregation],
        quantiles: &[f64],
        options: AggregationOptions,
    ) -> Result<Self> {
        require_non_empty("arithmetic aggregation", "aggregations", aggregations)?;
        let mut operations: Vec<(ArithmeticAggregation, Option<f64>)> = Vec::new();
        for aggregation in order_preserving_unique(aggregations.iter().copied()) {
            if aggregation == ArithmeticAggregation::Quantile {
                require_non_empty("quantile aggregation", "quantiles", quantiles)?;
                operations.extend(quantiles.iter().map(|q| (aggregation, Some(*q))));
            } else {
                operations.push((aggregation, None));
            }
        }

        let index_column = self.index_column(&options)?;
        let input = self.resolve_inputs(vec![subset.into()])?;
        let transformers = self.build_transformers(
            &input,
            &operations,
            &[()],
            |(aggregation, _)| TransformerKind::ArithmeticAggregation(*aggregation),
            |(aggregation, quantile), columns, _| {
                ArithmeticAggregationTransformer::build(
                    *aggregation,
                    columns[0].clone(),
                    *quantile,
                    options.cumulative,
                    options.filter.clone(),
                )
            },
        )?;
        self.with_aggregations(transformers, index_column, &options)
    }

    /// Entropy of each target column's values per value of a source column.
    ///
    /// # Errors
    ///
    /// Fails on unknown columns, a row filter or an unusable index column.
    pub fn with_entity_entropy(
        &self,
        sources: impl Into<Selection>,
        targets: impl Into<Selection>,
        options: AggregationOptions,
    ) -> Result<Self> {
        options.reject_filter("entity entropy")?;
        let index_column = self.index_column(&options)?;
        let input = self.resolve_inputs(vec![sources.into(), targets.into()])?;
        let transformers = self.build_transformers(
            &input,
            &[()],
            &[()],
            |_| TransformerKind::EntityEntropy,
            |_, columns, _| {
                Ok(Transformer::leaf(EntityEntropyTransformer::new(
                    columns[0].clone(),
                    columns[1].clone(),
                    options.cumulative,
                )))
            },
        )?;
        self.with_aggregations(transformers, index_column, &options)
    }

    /// # Errors
    ///
    /// Fails on unknown columns or an unusable index column.
    pub fn with_pointwise_mutual_information(
        &self,
        left: impl Into<Selection>,
        right: impl Into<Selection>,
        options: AggregationOptions,
    ) -> Result<Self> {
        let index_column = self.index_column(&options)?;
        let input = self.resolve_inputs(vec![left.into(), right.into()])?;
        let transformers = self.build_transformers(
            &input,
            &[()],
            &[()],
            |_| TransformerKind::PointwiseMutualInformation,
            |_, columns, _| {
                Ok(Transformer::leaf(PointwiseMutualInformationTransformer::new(
                    columns[0].clone(),
                    columns[1].clone(),
                    options.cumulative,
                    options.filter.clone(),
                )))
            },
        )?;
        self.with_aggregations(transformers, index_column, &options)
    }

    // === Generic operations ===

    /// Appends pre-built transformers, dropping those whose output exists.
    pub fn with_transformers(&self, transformers: Vec<Transformer>, auxiliary: bool) -> Self {
        self.with_added_to_current_layer(transformers, auxiliary)
    }

    /// Freezes the current layer into the schema and starts a new one.
    ///
    /// # Errors
    ///
    /// Fails when a layer output collides with an existing column name.
    pub fn with_new_layer(&self) -> Result<Self> {
        let dataset = self
            .dataset
            .with_schema(&layer_schema(self.current_layer())?)?;
        let mut layers = self.layers.clone();
        layers.push(Vec::new().into());
        debug!(layers = layers.len(), columns = dataset.num_columns(), "started new layer");
        Ok(Self {
            dataset,
            layers,
            options: self.options,
            auxiliary_columns: self.auxiliary_columns.clone(),
        })
    }

    /// Stacks every layer on the lazy frame and strips auxiliary columns.
    ///
    /// # Errors
    ///
    /// Fails when a layer output collides with an existing column name.
    pub fn collect_plan(&self) -> Result<Dataset> {
        let mut dataset = self
            .dataset
            .with_schema(&layer_schema(self.current_layer())?)?;
        for layer in &self.layers {
            dataset = dataset.with_columns(layer.iter().map(Transformer::transform).collect());
        }
        Ok(dataset.without_columns(&self.auxiliary_columns))
    }

    /// Like [`Pipeline::collect_plan`], with the plan cached for reuse.
    ///
    /// # Errors
    ///
    /// Fails when a layer output collides with an existing column name.
    pub fn collect_plan_cached(&self) -> Result<Dataset> {
        Ok(self.collect_plan()?.cached())
    }

    /// Materializes the pipeline.
    ///
    /// # Errors
    ///
    /// Fails when planning fails or the compute engine reports an error.
    pub fn collect(&self) -> Result<DataFrame> {
        let plan = self.collect_plan()?;
        info!(
            layers = self.layers.len(),
            columns = plan.num_columns(),
            auxiliary = self.auxiliary_columns.len(),
            "collecting feature pipeline"
        );
        plan.collect()
    }

    // === Construction helpers ===

    fn optimizer(&self) -> Optimizer {
        Optimizer::new(self.options.optimization_level)
    }

    fn validator(&self) -> Validator {
        Validator::new(self.options.validation_mode)
    }

    fn resolve_inputs(&self, selections: Vec<Selection>) -> Result<Vec<Vec<ColumnSpecification>>> {
        self.dataset.resolve_all(&selections)
    }

    /// Expands operations x column combinations x parameters into validated
    /// transformers, in that nesting order.
    fn build_transformers<O, P>(
        &self,
        input_columns: &[Vec<ColumnSpecification>],
        operations: &[O],
        params: &[P],
        kind_of: impl Fn(&O) -> TransformerKind,
        build: impl Fn(&O, &[ColumnSpecification], &P) -> featurs_transform::Result<Transformer>,
    ) -> Result<Vec<Transformer>> {
        let combinations = cartesian_product(input_columns);
        debug!(
            combinations = combinations.len(),
            operations = operations.len(),
            params = params.len(),
            "expanding transformer declarations"
        );

        let optimizer = self.optimizer();
        let validator = self.validator();
        let mut transformers = Vec::new();
        for operation in operations {
            let optimized = optimizer.optimize_input_columns(kind_of(operation), combinations.clone());
            for columns in &optimized {
                for param in params {
                    let transformer = build(operation, columns, param)?;
                    if validator.validate(&transformer, columns)? {
                        transformers.push(transformer);
                    }
                }
            }
        }
        Ok(transformers)
    }

    fn with_unary_operations<O: Clone + Eq + std::hash::Hash>(
        &self,
        operation: &str,
        subset: Selection,
        operations: &[O],
        kind_of: impl Fn(&O) -> TransformerKind,
        build: impl Fn(&O, ColumnSpecification) -> featurs_transform::Result<Transformer>,
        auxiliary: bool,
    ) -> Result<Self> {
        require_non_empty(operation, "operations", operations)?;
        let input = self.resolve_inputs(vec![subset])?;
        let operations = order_preserving_unique(operations.iter().cloned());
        let transformers = self.build_transformers(
            &input,
            &operations,
            &[()],
            kind_of,
            |op, columns, _| build(op, columns[0].clone()),
        )?;
        Ok(self.with_added_to_current_layer(transformers, auxiliary))
    }

    #[allow(clippy::too_many_arguments)]
    fn with_binary_operations<O: Clone + Eq + std::hash::Hash>(
        &self,
        operation: &str,
        left: Selection,
        right: Selection,
        operations: &[O],
        kind_of: impl Fn(&O) -> TransformerKind,
        build: impl Fn(&O, ColumnSpecification, ColumnSpecification) -> featurs_transform::Result<Transformer>,
        auxiliary: bool,
    ) -> Result<Self> {
        require_non_empty(operation, "operations", operations)?;
        let input = self.resolve_inputs(vec![left, right])?;
        let operations = order_preserving_unique(operations.iter().cloned());
        let transformers = self.build_transformers(
            &input,
            &operations,
            &[()],
            kind_of,
            |op, columns, _| build(op, columns[0].clone(), columns[1].clone()),
        )?;
        Ok(self.with_added_to_current_layer(transformers, auxiliary))
    }

    fn with_unary_aggregation(
        &self,
        subset: Selection,
        kind: TransformerKind,
        options: AggregationOptions,
        build: impl Fn(ColumnSpecification, &AggregationOptions) -> Transformer,
    ) -> Result<Self> {
        let index_column = self.index_column(&options)?;
        let input = self.resolve_inputs(vec![subset])?;
        let transformers = self.build_transformers(
            &input,
            &[()],
            &[()],
            |_| kind,
            |_, columns, _| Ok(build(columns[0].clone(), &options)),
        )?;
        self.with_aggregations(transformers, index_column, &options)
    }

    fn index_column(&self, options: &AggregationOptions) -> Result<Option<ColumnSpecification>> {
        let index_column = options
            .index_column
            .as_deref()
            .map(|name| self.dataset.column(name))
            .transpose()?;
        Validator::validate_time_window_index_column(&options.time_windows, index_column.as_ref())?;
        Ok(index_column)
    }

    /// Wraps aggregations in `Rolling`, then in `Over`, and appends them.
    fn with_aggregations(
        &self,
        transformers: Vec<Transformer>,
        index_column: Option<ColumnSpecification>,
        options: &AggregationOptions,
    ) -> Result<Self> {
        let rolled = rolling_transformers(transformers, index_column, &options.time_windows)?;
        let key_lists = self.dataset.resolve_all(&options.over_columns_combinations)?;
        let grouped = over_transformers(rolled, &key_lists)?;
        Ok(self.with_added_to_current_layer(grouped, options.auxiliary))
    }

    fn with_added_to_current_layer(&self, transformers: Vec<Transformer>, auxiliary: bool) -> Self {
        let present: Vec<ColumnSpecification> = self
            .schema()
            .iter()
            .cloned()
            .chain(
                self.current_layer()
                    .iter()
                    .map(Transformer::output_column_specification),
            )
            .collect();
        let additions = Optimizer::deduplicate_transformers_against_layers(&present, transformers);
        debug!(added = additions.len(), layer = self.layers.len(), "extending current layer");

        let mut auxiliary_columns = self.auxiliary_columns.clone();
        if auxiliary {
            auxiliary_columns.extend(additions.iter().map(Transformer::output_column_specification));
        }

        let current: Vec<Transformer> = self
            .current_layer()
            .iter()
            .cloned()
            .chain(additions)
            .collect();
        let mut layers = self.layers.clone();
        match layers.last_mut() {
            Some(last) => *last = current.into(),
            None => layers.push(current.into()),
        }

        Self {
            dataset: self.dataset.clone(),
            layers,
            options: self.options,
            auxiliary_columns,
        }
    }
}

fn require_non_empty<T>(operation: &str, what: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(PipelineError::Construction {
            operation: operation.to_string(),
            message: format!("no {what} given"),
        });
    }
    Ok(())
}

fn layer_schema(layer: &[Transformer]) -> Result<Schema> {
    Ok(Schema::new(
        layer
            .iter()
            .map(Transformer::output_column_specification)
            .collect(),
    )?)
}

fn rolling_transformers(
    transformers: Vec<Transformer>,
    index_column: Option<ColumnSpecification>,
    time_windows: &[Option<TimeWindow>],
) -> Result<Vec<Transformer>> {
    let Some(index_column) = index_column else {
        return Ok(transformers);
    };
    if time_windows.is_empty() {
        return Ok(transformers);
    }

    let (windows, all_valid) = valid_param_options(time_windows, Option::is_some);
    let mut all = if all_valid { Vec::new() } else { transformers.clone() };
    for transformer in &transformers {
        for window in windows.iter().flatten() {
            let rolling = Rolling::new(transformer.clone(), index_column.clone(), window.clone())?;
            all.push(rolling.into());
        }
    }
    Ok(all)
}

fn over_transformers(
    transformers: Vec<Transformer>,
    key_lists: &[Vec<ColumnSpecification>],
) -> Result<Vec<Transformer>> {
    if key_lists.is_empty() {
        return Ok(transformers);
    }

    let (key_lists, all_valid) = valid_param_options(key_lists, |keys| !keys.is_empty());
    let mut all = if all_valid { Vec::new() } else { transformers.clone() };
    for transformer in &transformers {
        for keys in &key_lists {
            all.push(Over::new(transformer.clone(), keys.clone())?.into());
        }
    }
    Ok(all)
}
