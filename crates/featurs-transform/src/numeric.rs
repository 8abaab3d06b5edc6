//! Row-wise numeric transformers.

use polars::prelude::{DataType, Expr, col, lit};

use featurs_common::format_numeric;
use featurs_model::{ColumnSpecification, ColumnType, ColumnTypeSet};

use crate::kind::{ArithmeticOperation, GoniometricFunction, Scaling, TransformerKind};
use crate::transformer::{LeafTransformer, true_div};

fn numeric_input() -> Vec<ColumnTypeSet> {
    vec![ColumnType::Numeric.into()]
}

/// Raises a column to an integer power: `<c>_pow_<d>`.
#[derive(Debug, Clone)]
pub struct PolynomialTransformer {
    column: ColumnSpecification,
    degree: i32,
}

impl PolynomialTransformer {
    pub fn new(column: ColumnSpecification, degree: i32) -> Self {
        Self { column, degree }
    }
}

impl LeafTransformer for PolynomialTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Polynomial
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!("{}_pow_{}", self.column.name, self.degree)
    }

    fn expression(&self) -> Expr {
        if self.degree < 0 {
            // Negative powers of integers are not representable as integers.
            col(self.column.name.as_str())
                .cast(DataType::Float64)
                .pow(lit(self.degree))
        } else {
            col(self.column.name.as_str()).pow(lit(self.degree))
        }
    }
}

/// Logarithm to a given base: `<c>_ln` for base e, `<c>_log<base>` otherwise.
#[derive(Debug, Clone)]
pub struct LogTransformer {
    column: ColumnSpecification,
    base: f64,
}

impl LogTransformer {
    pub fn new(column: ColumnSpecification, base: f64) -> Self {
        Self { column, base }
    }

    pub fn natural(column: ColumnSpecification) -> Self {
        Self::new(column, std::f64::consts::E)
    }
}

impl LeafTransformer for LogTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Log
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        if self.base == std::f64::consts::E {
            format!("{}_ln", self.column.name)
        } else {
            format!("{}_log{}", self.column.name, format_numeric(self.base))
        }
    }

    fn expression(&self) -> Expr {
        col(self.column.name.as_str()).log(lit(self.base))
    }
}

/// Sine or cosine of a column.
#[derive(Debug, Clone)]
pub struct GoniometricTransformer {
    column: ColumnSpecification,
    function: GoniometricFunction,
}

impl GoniometricTransformer {
    pub fn new(column: ColumnSpecification, function: GoniometricFunction) -> Self {
        Self { column, function }
    }
}

impl LeafTransformer for GoniometricTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Goniometric(self.function)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!("{}_{}", self.column.name, self.function.as_str())
    }

    fn expression(&self) -> Expr {
        let column = col(self.column.name.as_str());
        match self.function {
            GoniometricFunction::Sin => column.sin(),
            GoniometricFunction::Cos => column.cos(),
        }
    }
}

/// Standard or min-max scaling over the whole column.
#[derive(Debug, Clone)]
pub struct ScalingTransformer {
    column: ColumnSpecification,
    scaling: Scaling,
}

impl ScalingTransformer {
    pub fn new(column: ColumnSpecification, scaling: Scaling) -> Self {
        Self { column, scaling }
    }
}

impl LeafTransformer for ScalingTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Scaling(self.scaling)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        numeric_input()
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!("{}_{}_scaled", self.column.name, self.scaling.as_str())
    }

    fn expression(&self) -> Expr {
        let column = col(self.column.name.as_str());
        match self.scaling {
            Scaling::Standard => true_div(column.clone() - column.clone().mean(), column.std(1)),
            Scaling::MinMax => true_div(
                column.clone() - column.clone().min(),
                column.clone().max() - column.min(),
            ),
        }
    }
}

/// Binary arithmetic between two numeric or boolean columns: `<l>_<op>_<r>`.
#[derive(Debug, Clone)]
pub struct ArithmeticTransformer {
    left: ColumnSpecification,
    right: ColumnSpecification,
    operation: ArithmeticOperation,
}

impl ArithmeticTransformer {
    pub fn new(
        left: ColumnSpecification,
        right: ColumnSpecification,
        operation: ArithmeticOperation,
    ) -> Self {
        Self {
            left,
            right,
            operation,
        }
    }
}

impl LeafTransformer for ArithmeticTransformer {
    fn kind(&self) -> TransformerKind {
        TransformerKind::Arithmetic(self.operation)
    }

    fn input_type(&self) -> Vec<ColumnTypeSet> {
        let accepted = ColumnType::Numeric | ColumnType::Boolean;
        vec![accepted, accepted]
    }

    fn return_type(&self) -> ColumnType {
        ColumnType::Numeric
    }

    fn name(&self) -> String {
        format!(
            "{}_{}_{}",
            self.left.name,
            self.operation.as_str(),
            self.right.name
        )
    }

    fn expression(&self) -> Expr {
        let left = col(self.left.name.as_str());
        let right = col(self.right.name.as_str());
        match self.operation {
            ArithmeticOperation::Add => left + right,
            ArithmeticOperation::Subtract => left - right,
            ArithmeticOperation::Multiply => left * right,
            ArithmeticOperation::Divide => true_div(left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let x = ColumnSpecification::numeric("X");
        let y = ColumnSpecification::numeric("Y");
        assert_eq!(PolynomialTransformer::new(x.clone(), 2).name(), "X_pow_2");
        assert_eq!(LogTransformer::natural(x.clone()).name(), "X_ln");
        assert_eq!(LogTransformer::new(x.clone(), 10.0).name(), "X_log10");
        assert_eq!(LogTransformer::new(x.clone(), 2.5).name(), "X_log2.5");
        assert_eq!(
            GoniometricTransformer::new(x.clone(), GoniometricFunction::Cos).name(),
            "X_cos"
        );
        assert_eq!(
            ScalingTransformer::new(x.clone(), Scaling::MinMax).name(),
            "X_minmax_scaled"
        );
        assert_eq!(
            ArithmeticTransformer::new(x, y, ArithmeticOperation::Subtract).name(),
            "X_subtract_Y"
        );
    }

    #[test]
    fn test_arithmetic_accepts_booleans() {
        let t = ArithmeticTransformer::new(
            ColumnSpecification::numeric("X"),
            ColumnSpecification::boolean("B"),
            ArithmeticOperation::Add,
        );
        let input = t.input_type();
        assert_eq!(input.len(), 2);
        assert!(input[1].contains(ColumnType::Boolean));
        assert!(!input[1].contains(ColumnType::Text));
    }
}
