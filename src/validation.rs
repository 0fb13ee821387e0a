use crate::error::ClusterError;
use num_traits::Float;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of the construction-time checks. A populated `serial_fallback`
/// means the data-parallel scan could not be scheduled and the serial scan
/// ran in its place; callers surface it as a model warning.
#[derive(Debug, Default)]
pub(crate) struct ValidationReport {
    pub(crate) serial_fallback: Option<String>,
}

/// Checks an input matrix before a model takes ownership of it: the matrix
/// must have at least one record and one feature, every record must have the
/// same number of features, and every cell must be a finite number.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataValidator<'a, T> {
    data: &'a [Vec<T>],
}

impl<'a, T: Float + Send + Sync> DataValidator<'a, T> {
    pub(crate) fn new(data: &'a [Vec<T>]) -> Self {
        Self { data }
    }

    pub(crate) fn validate(&self) -> Result<ValidationReport, ClusterError> {
        if self.data.is_empty() || self.data[0].is_empty() {
            return Err(ClusterError::EmptyDataset);
        }
        let dims_0th = self.data[0].len();
        for (n, record) in self.data.iter().enumerate() {
            let dims_nth = record.len();
            if dims_nth != dims_0th {
                return Err(ClusterError::DimensionMismatch(format!(
                    "0th record has {dims_0th} features, but {n}th has {dims_nth}"
                )));
            }
        }
        let mut report = ValidationReport::default();
        self.check_finite(&mut report)?;
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn check_finite(&self, report: &mut ValidationReport) -> Result<(), ClusterError> {
        match crate::model::worker_pool() {
            Ok(pool) => pool.install(|| {
                self.data
                    .par_iter()
                    .enumerate()
                    .try_for_each(|(n, record)| check_record(n, record))
            }),
            Err(e) => {
                report.serial_fallback = Some(e.to_string());
                self.check_finite_serial()
            }
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn check_finite(&self, _report: &mut ValidationReport) -> Result<(), ClusterError> {
        self.check_finite_serial()
    }

    fn check_finite_serial(&self) -> Result<(), ClusterError> {
        self.data
            .iter()
            .enumerate()
            .try_for_each(|(n, record)| check_record(n, record))
    }
}

fn check_record<T: Float>(n: usize, record: &[T]) -> Result<(), ClusterError> {
    for element in record {
        if element.is_nan() {
            return Err(ClusterError::Numeric(format!(
                "NaN in record {n}; select an imputation method for incomplete records"
            )));
        }
        if element.is_infinite() {
            return Err(ClusterError::Numeric(format!(
                "record {n} contains non-finite element(s)"
            )));
        }
    }
    Ok(())
}
