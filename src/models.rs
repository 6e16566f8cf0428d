use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Key under which a namespace entry lists the dimensions used for any
/// metric without its own entry.
pub const DEFAULT_DIMENSIONS_KEY: &str = "DEFAULT";

/// Fixed chart hint attached to every catalog entry.
pub const DEFAULT_CHART_TYPE: &str = "line";

/// A name/value tag narrowing a metric to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Catalog filter: a dimension name, optionally pinned to one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionFilter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl DimensionFilter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// The filter as a concrete dimension, when it carries a value.
    pub fn to_dimension(&self) -> Option<Dimension> {
        self.value
            .as_ref()
            .map(|value| Dimension::new(self.name.clone(), value.clone()))
    }
}

impl From<Dimension> for DimensionFilter {
    fn from(dimension: Dimension) -> Self {
        Self {
            name: dimension.name,
            value: Some(dimension.value),
        }
    }
}

/// Dimensions configured for one namespace, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceDimensions(pub HashMap<String, Vec<Dimension>>);

impl NamespaceDimensions {
    /// Dimensions for `metric_name`, falling back to the `DEFAULT` entry and
    /// then to no dimensions at all.
    pub fn dimensions_for(&self, metric_name: &str) -> &[Dimension] {
        self.0
            .get(metric_name)
            .or_else(|| self.0.get(DEFAULT_DIMENSIONS_KEY))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Per-namespace dimension mappings supplied by the inventory service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitoringInfo(pub HashMap<String, NamespaceDimensions>);

impl MonitoringInfo {
    pub fn namespace(&self, namespace: &str) -> Option<&NamespaceDimensions> {
        self.0.get(namespace)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_id: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub monitoring_info: MonitoringInfo,
}

impl Resource {
    /// Dimensions to query `key` with, or `None` when this resource is not
    /// monitored in the key's namespace.
    pub fn query_dimensions(&self, key: &MetricKey) -> Option<&[Dimension]> {
        self.monitoring_info
            .namespace(&key.namespace)
            .map(|ns| ns.dimensions_for(&key.metric_name))
    }

    pub fn has_dimension_value(&self, value: &str) -> bool {
        self.dimensions.iter().any(|d| d.value == value)
    }
}

/// A `<namespace>.<metric name>` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricKey {
    pub namespace: String,
    pub metric_name: String,
}

impl MetricKey {
    /// Splits on dots and keeps the first two segments. A key without a dot
    /// has an empty namespace. Never fails.
    pub fn parse(key: &str) -> Self {
        let mut parts = key.split('.');
        let first = parts.next().unwrap_or_default();
        match parts.next() {
            Some(second) => Self {
                namespace: first.to_string(),
                metric_name: second.to_string(),
            },
            None => Self {
                namespace: String::new(),
                metric_name: first.to_string(),
            },
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.metric_name)
    }
}

/// One catalog entry with display hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    pub chart_type: String,
    #[serde(default)]
    pub chart_options: Map<String, Value>,
}

impl MetricDescriptor {
    pub fn new(key: &MetricKey, unit: String) -> Self {
        Self {
            key: key.to_string(),
            name: key.metric_name.clone(),
            unit,
            chart_type: DEFAULT_CHART_TYPE.to_string(),
            chart_options: Map::new(),
        }
    }
}

/// Time series of several resources sharing one set of timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDataResult {
    pub labels: Vec<String>,
    pub resource_values: HashMap<String, Vec<f64>>,
}
