use crate::raster::RasterDataType;
use serde::{Deserialize, Serialize};

/// The sample semantics of one raster band: a name, the stored data type, an
/// optional no-data marker and an optional valid measurement range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDimension {
    name: String,
    data_type: RasterDataType,
    no_data_value: Option<f64>,
    measurement_range: Option<(f64, f64)>,
}

impl SampleDimension {
    pub fn new<S: Into<String>>(name: S, data_type: RasterDataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            no_data_value: None,
            measurement_range: None,
        }
    }

    /// The default band named after its index, e.g. `band_0`.
    pub fn band(index: usize, data_type: RasterDataType) -> Self {
        Self::new(format!("band_{index}"), data_type)
    }

    #[must_use]
    pub fn with_no_data_value(mut self, no_data_value: f64) -> Self {
        self.no_data_value = Some(no_data_value);
        self
    }

    #[must_use]
    pub fn with_measurement_range(mut self, min: f64, max: f64) -> Self {
        self.measurement_range = Some((min, max));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> RasterDataType {
        self.data_type
    }

    pub fn no_data_value(&self) -> Option<f64> {
        self.no_data_value
    }

    pub fn measurement_range(&self) -> Option<(f64, f64)> {
        self.measurement_range
    }

    /// True if `value` is the no-data marker. NaN markers match NaN values.
    #[allow(clippy::eq_op)]
    pub fn is_no_data(&self, value: f64) -> bool {
        self.no_data_value.is_some_and(|no_data_value| {
            value == no_data_value || (no_data_value != no_data_value && value != value)
        })
    }
}
