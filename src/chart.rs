//! Serializable subset of the Plotly figure schema.
//!
//! Only the attributes the IPO chart uses are modelled. Optional fields are
//! skipped when unset so the JSON stays close to what plotly.js expects.

use anyhow::{Context, Result};
use serde::Serialize;

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, Default, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "markers+text")]
    MarkersText,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub textposition: Option<&'static str>,
    pub showlegend: bool,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

impl Trace {
    pub fn scatter(x: Vec<f64>, y: Vec<f64>, mode: Mode) -> Self {
        Self {
            kind: "scatter",
            x,
            y,
            mode,
            line: None,
            marker: None,
            text: Vec::new(),
            textposition: None,
            showlegend: false,
            xaxis: "x",
            yaxis: "y",
        }
    }

    pub fn line(mut self, line: Line) -> Self {
        self.line = Some(line);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn text(mut self, text: impl Into<String>, position: &'static str) -> Self {
        self.text = vec![text.into()];
        self.textposition = Some(position);
        self
    }

    pub fn axes(mut self, xaxis: &'static str, yaxis: &'static str) -> Self {
        self.xaxis = xaxis;
        self.yaxis = yaxis;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Line {
    pub width: f64,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dash: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub size: f64,
    pub color: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub family: &'static str,
    pub size: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<&'static str>,
}

impl Title {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: None,
            x: None,
            xanchor: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zerolinecolor: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: String,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x: f64,
    pub y: f64,
    pub xanchor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yanchor: Option<&'static str>,
    pub font: Font,
    pub showarrow: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: Line,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
    pub xaxis: Axis,
    pub xaxis2: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
}

impl Figure {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("could not serialize figure")
    }

    /// Standalone page that pulls plotly.js from the CDN.
    pub fn to_html(&self) -> Result<String> {
        // keep a "</script>" inside any string from closing the tag early
        let json = self.to_json()?.replace("</", "<\\/");
        let title = self
            .layout
            .title
            .as_ref()
            .map(|t| t.text.as_str())
            .unwrap_or("chart")
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{PLOTLY_JS}"></script>
</head>
<body>
<div id="chart"></div>
<script>
const fig = {json};
Plotly.newPlot("chart", fig.data, fig.layout);
</script>
</body>
</html>
"#
        ))
    }
}
