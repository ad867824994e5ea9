//! Datasets para las gráficas del dashboard
//!
//! Cada forma de dataset es una variante distinta, serializada con un campo
//! `type` para que el cliente sepa cómo dibujarla.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarPoint {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinePoint {
    pub x: String,
    pub y: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartDataset {
    Bar { title: String, points: Vec<BarPoint> },
    Pie { title: String, slices: Vec<PieSlice> },
    Line { title: String, points: Vec<LinePoint> },
}

impl ChartDataset {
    pub fn title(&self) -> &str {
        match self {
            ChartDataset::Bar { title, .. } | ChartDataset::Pie { title, .. } | ChartDataset::Line { title, .. } => {
                title
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_is_tagged() {
        let dataset = ChartDataset::Pie {
            title: "Results".to_string(),
            slices: vec![PieSlice {
                label: "Passed".to_string(),
                value: 3,
            }],
        };
        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["type"], "pie");
        assert_eq!(json["slices"][0]["value"], 3);
        assert_eq!(dataset.title(), "Results");
    }
}
