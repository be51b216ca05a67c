//! Two-panel chart composition
//!
//! The composer stacks the price panel above the indicator panel, forces both
//! onto the selected date interval, and scales each y-axis to the data it
//! draws. Rendering is left to whatever consumes [`ChartSpec::to_plotly`].

use crate::core::range::{self, Bounds, DateInterval};
use crate::core::series::Series;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Value, json};

pub const PRICE_LABEL: &str = "NatGas Price";
pub const INDICATOR_LABEL: &str = "Commercial Activity";
pub const HOVER_TEMPLATE: &str = "%{x|%Y-%m-%d}";
pub const DEFAULT_HEIGHT: u32 = 1000;

const DATE_FORMAT: &str = "%Y-%m-%d";
const VERTICAL_SPACING: f64 = 0.05;
const ROW_HEIGHTS: [f64; 2] = [0.5, 0.5];
const TRANSPARENT: &str = "rgba(0,0,0,0)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// Fill down to y = 0.
    ToZeroY,
    /// Fill to the previous trace.
    ToNextY,
}

impl Fill {
    fn as_str(&self) -> &'static str {
        match self {
            Fill::ToZeroY => "tozeroy",
            Fill::ToNextY => "tonexty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub series: Series,
    pub fill: Fill,
    pub line: LineStyle,
    /// Draw mode, left to the renderer's default when unset.
    pub mode: Option<&'static str>,
}

/// Text placed in paper coordinates (0..1 over the whole figure).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: u32,
    pub font_color: String,
    pub opacity: f64,
}

impl Annotation {
    fn label(text: &str, y: f64) -> Self {
        Self {
            text: text.to_string(),
            x: 0.0,
            y,
            font_size: 30,
            font_color: "#050303".to_string(),
            opacity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub trace: Trace,
    /// `None` when the trace has no measurable values; the axis then keeps
    /// the renderer's autorange.
    pub y_range: Option<Bounds>,
    pub annotation: Annotation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// Shared x-axis range applied to both panels.
    pub x_range: DateInterval,
    pub price: Panel,
    pub indicator: Panel,
    pub height: u32,
    pub show_legend: bool,
    pub show_grid: bool,
    pub hover_mode: &'static str,
    pub hover_template: &'static str,
}

/// Composes the two-panel chart for one interaction.
pub fn compose(price: &Series, indicator: &Series, interval: DateInterval) -> ChartSpec {
    let price_panel = Panel {
        trace: Trace {
            name: "NATGAS".to_string(),
            series: price.clone(),
            fill: Fill::ToZeroY,
            line: LineStyle {
                color: "black".to_string(),
                width: 1.0,
            },
            mode: None,
        },
        y_range: range::bounds(price),
        annotation: Annotation::label(PRICE_LABEL, 1.1),
    };
    let indicator_panel = Panel {
        trace: Trace {
            name: " ".to_string(),
            series: indicator.clone(),
            fill: Fill::ToNextY,
            line: LineStyle {
                color: "#403824".to_string(),
                width: 1.0,
            },
            mode: Some("lines"),
        },
        y_range: range::bounds(indicator),
        annotation: Annotation::label(INDICATOR_LABEL, 0.45),
    };

    ChartSpec {
        x_range: interval,
        price: price_panel,
        indicator: indicator_panel,
        height: DEFAULT_HEIGHT,
        show_legend: false,
        show_grid: false,
        hover_mode: "x unified",
        hover_template: HOVER_TEMPLATE,
    }
}

impl ChartSpec {
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn panels(&self) -> [&Panel; 2] {
        [&self.price, &self.indicator]
    }

    /// Renders a Plotly figure (`data` + `layout`).
    ///
    /// Both traces sit on the first x-axis so hovering is synchronised across
    /// panels; the second x-axis only carries the tick labels.
    pub fn to_plotly(&self) -> Value {
        let x_range = json!([fmt_date(self.x_range.from), fmt_date(self.x_range.to)]);
        let (top, bottom) = row_domains();

        let mut yaxis = json!({ "anchor": "x", "domain": top, "showgrid": self.show_grid });
        if let Some(b) = self.price.y_range {
            yaxis["range"] = json!(b.as_range());
        }
        let mut yaxis2 = json!({ "anchor": "x2", "domain": bottom, "showgrid": self.show_grid });
        if let Some(b) = self.indicator.y_range {
            yaxis2["range"] = json!(b.as_range());
        }

        json!({
            "data": [
                self.trace_json(&self.price.trace, "y"),
                self.trace_json(&self.indicator.trace, "y2"),
            ],
            "layout": {
                "height": self.height,
                "showlegend": self.show_legend,
                "hovermode": self.hover_mode,
                "hoverlabel": {
                    "bgcolor": TRANSPARENT,
                    "font": { "size": 10, "color": "rgba(0,0,0,10)", "family": "Ariel" },
                },
                "uniformtext": { "minsize": 12 },
                "paper_bgcolor": TRANSPARENT,
                "plot_bgcolor": TRANSPARENT,
                "xaxis": {
                    "anchor": "y",
                    "domain": [0.0, 1.0],
                    "matches": "x2",
                    "showticklabels": false,
                    "range": x_range,
                    "showgrid": self.show_grid,
                },
                "xaxis2": {
                    "anchor": "y2",
                    "domain": [0.0, 1.0],
                    "range": x_range,
                    "showgrid": self.show_grid,
                },
                "yaxis": yaxis,
                "yaxis2": yaxis2,
                "annotations": [
                    annotation_json(&self.price.annotation),
                    annotation_json(&self.indicator.annotation),
                ],
            },
        })
    }

    fn trace_json(&self, trace: &Trace, yaxis: &str) -> Value {
        let x: Vec<String> = trace.series.dates().map(fmt_date).collect();
        let y: Vec<f64> = trace.series.values().collect();
        let mut value = json!({
            "type": "scatter",
            "name": trace.name,
            "x": x,
            "y": y,
            "fill": trace.fill.as_str(),
            "line": { "color": trace.line.color, "width": trace.line.width },
            "xaxis": "x",
            "yaxis": yaxis,
            "hovertemplate": self.hover_template,
            "hoverinfo": "skip",
        });
        if let Some(mode) = trace.mode {
            value["mode"] = json!(mode);
        }
        value
    }
}

fn annotation_json(annotation: &Annotation) -> Value {
    json!({
        "text": annotation.text,
        "xref": "paper",
        "yref": "paper",
        "x": annotation.x,
        "y": annotation.y,
        "showarrow": false,
        "opacity": annotation.opacity,
        "font": { "size": annotation.font_size, "color": annotation.font_color },
    })
}

/// Paper-space y domains of the top and bottom rows.
fn row_domains() -> ([f64; 2], [f64; 2]) {
    let usable = 1.0 - VERTICAL_SPACING;
    let top_height = usable * ROW_HEIGHTS[0];
    let bottom_height = usable * ROW_HEIGHTS[1];
    ([1.0 - top_height, 1.0], [0.0, bottom_height])
}

fn fmt_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::series::Observation;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn interval() -> DateInterval {
        DateInterval::new(date("2019-01-31"), date("2019-03-01"))
    }

    fn prices() -> Series {
        Series::from_points(vec![
            Observation::new(date("2019-01-31"), 2.9),
            Observation::new(date("2019-02-01"), 2.7),
            Observation::new(date("2019-02-04"), 2.6),
        ])
    }

    fn indicator() -> Series {
        Series::from_points(vec![
            Observation::new(date("2018-12-31"), -150.0),
            Observation::new(date("2019-02-05"), 90.0),
            Observation::new(date("2019-06-05"), 10.0),
        ])
    }

    #[test]
    fn test_compose_price_range_is_min_max() {
        let spec = compose(&prices(), &indicator(), interval());

        assert_eq!(
            spec.price.y_range,
            Some(Bounds { min: 2.6, max: 2.9 })
        );
        assert_eq!(spec.price.trace.fill, Fill::ToZeroY);
        assert_eq!(spec.price.annotation.text, PRICE_LABEL);
    }

    #[test]
    fn test_compose_keeps_full_indicator_history() {
        let spec = compose(&prices(), &indicator(), interval());

        // Indicator data outside the interval is kept; only the axis clips it.
        assert_eq!(spec.indicator.trace.series.len(), 3);
        assert_eq!(
            spec.indicator.y_range,
            Some(Bounds {
                min: -150.0,
                max: 90.0
            })
        );
        assert_eq!(spec.indicator.trace.fill, Fill::ToNextY);
        assert_eq!(spec.x_range, interval());
    }

    #[test]
    fn test_compose_empty_price_has_no_range() {
        let spec = compose(&Series::default(), &indicator(), interval());

        assert_eq!(spec.price.y_range, None);

        let figure = spec.to_plotly();
        assert!(figure["layout"]["yaxis"].get("range").is_none());
        assert_eq!(figure["layout"]["yaxis2"]["range"], json!([-150.0, 90.0]));
    }

    #[test]
    fn test_plotly_layout() {
        let figure = compose(&prices(), &indicator(), interval())
            .with_height(800)
            .to_plotly();
        let layout = &figure["layout"];

        assert_eq!(layout["height"], json!(800));
        assert_eq!(layout["showlegend"], json!(false));
        assert_eq!(layout["hovermode"], json!("x unified"));
        for axis in ["xaxis", "xaxis2", "yaxis", "yaxis2"] {
            assert_eq!(layout[axis]["showgrid"], json!(false), "{axis}");
        }
        assert_eq!(layout["xaxis"]["range"], json!(["2019-01-31", "2019-03-01"]));
        assert_eq!(layout["xaxis2"]["range"], layout["xaxis"]["range"]);
        assert_eq!(layout["yaxis"]["range"], json!([2.6, 2.9]));

        let annotations = layout["annotations"].as_array().unwrap();
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0]["text"], json!(PRICE_LABEL));
        assert_eq!(annotations[0]["y"], json!(1.1));
        assert_eq!(annotations[1]["text"], json!(INDICATOR_LABEL));
        assert_eq!(annotations[1]["y"], json!(0.45));
    }

    #[test]
    fn test_plotly_traces() {
        let figure = compose(&prices(), &indicator(), interval()).to_plotly();
        let data = figure["data"].as_array().unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["fill"], json!("tozeroy"));
        assert_eq!(data[0]["x"][0], json!("2019-01-31"));
        assert_eq!(data[0]["yaxis"], json!("y"));
        assert!(data[0].get("mode").is_none());
        assert_eq!(data[1]["fill"], json!("tonexty"));
        assert_eq!(data[1]["mode"], json!("lines"));
        assert_eq!(data[1]["yaxis"], json!("y2"));
        for trace in data {
            assert_eq!(trace["xaxis"], json!("x"));
            assert_eq!(trace["hovertemplate"], json!(HOVER_TEMPLATE));
        }
    }

    #[test]
    fn test_plotly_missing_values_are_null() {
        let with_gap = Series::from_points(vec![
            Observation::new(date("2019-02-05"), f64::NAN),
            Observation::new(date("2019-02-12"), 4.0),
        ]);

        let figure = compose(&prices(), &with_gap, interval()).to_plotly();

        assert_eq!(figure["data"][1]["y"], json!([null, 4.0]));
    }

    #[test]
    fn test_chart_spec_serializes_typed_form() {
        let spec = compose(&prices(), &Series::default(), interval());

        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["x_range"]["from"], json!("2019-01-31"));
        assert_eq!(value["price"]["trace"]["fill"], json!("tozeroy"));
        assert_eq!(value["price"]["y_range"], json!({ "min": 2.6, "max": 2.9 }));
        assert_eq!(value["indicator"]["trace"]["fill"], json!("tonexty"));
        assert_eq!(value["indicator"]["y_range"], json!(null));
        assert_eq!(value["show_legend"], json!(false));
    }

    #[test]
    fn test_row_domains_leave_spacing() {
        let (top, bottom) = row_domains();
        assert!((top[0] - 0.525).abs() < 1e-9);
        assert!((bottom[1] - 0.475).abs() < 1e-9);
        assert!((top[0] - bottom[1] - VERTICAL_SPACING).abs() < 1e-9);
    }
}
