//! Figure rendering.
//!
//! [`PlotlyHtmlRenderer`] turns layer specs into a standalone HTML page
//! that draws the map with plotly.js loaded from its CDN. Each layer maps
//! to one `scattergl` trace, in layer order, so later layers draw on top.

use std::path::Path;

use globe_map_map_models::{FigureLayout, HoverTemplate, LayerSpec, LayerStyle, MarkerStyle};
use serde_json::{Value, json};

use crate::MapError;

/// plotly.js bundle loaded by rendered pages.
pub const PLOTLY_CDN_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// A rendered, self-contained figure.
#[derive(Debug, Clone)]
pub struct Figure {
    spec: Value,
    html: String,
}

impl Figure {
    /// Plotly figure description (`data` and `layout`).
    #[must_use]
    pub const fn spec(&self) -> &Value {
        &self.spec
    }

    /// Full HTML document.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Writes the HTML document to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::Io`] if the directory or file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), MapError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.html)?;
        log::info!("Wrote figure to {}", path.display());
        Ok(())
    }
}

/// Turns an ordered layer list into a figure.
pub trait FigureRenderer {
    /// Renders `layers` in order with the given layout.
    ///
    /// # Errors
    ///
    /// Returns [`MapError`] if a layer is malformed or the figure cannot be
    /// serialized.
    fn render(&self, layers: &[LayerSpec], layout: &FigureLayout) -> Result<Figure, MapError>;
}

/// Renders figures as HTML pages driven by plotly.js.
#[derive(Debug, Clone)]
pub struct PlotlyHtmlRenderer {
    /// Script URL of the plotly.js bundle.
    pub plotly_url: String,
    /// Id of the element the figure is drawn into.
    pub element_id: String,
}

impl Default for PlotlyHtmlRenderer {
    fn default() -> Self {
        Self {
            plotly_url: PLOTLY_CDN_URL.to_string(),
            element_id: "globe-map".to_string(),
        }
    }
}

impl FigureRenderer for PlotlyHtmlRenderer {
    fn render(&self, layers: &[LayerSpec], layout: &FigureLayout) -> Result<Figure, MapError> {
        let data = layers.iter().map(trace).collect::<Result<Vec<_>, _>>()?;
        let spec = json!({
            "data": data,
            "layout": layout_json(layout),
        });

        // `</` inside an inline script would end the element early.
        let data_js = serde_json::to_string(&spec["data"])?.replace("</", "<\\/");
        let layout_js = serde_json::to_string(&spec["layout"])?.replace("</", "<\\/");

        let html = format!(
            r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>{title}</title>
  <script src="{plotly_url}"></script>
</head>
<body>
  <div id="{id}" style="width: {width}px; height: {height}px;"></div>
  <script>
    Plotly.newPlot("{id}", {data_js}, {layout_js}, {{ responsive: true }});
  </script>
</body>
</html>
"#,
            title = escape_html(&layout.title),
            plotly_url = self.plotly_url,
            id = self.element_id,
            width = layout.width,
            height = layout.height,
        );

        log::debug!("Rendered {} traces", layers.len());
        Ok(Figure { spec, html })
    }
}

fn trace(layer: &LayerSpec) -> Result<Value, MapError> {
    if layer.x.len() != layer.y.len() {
        return Err(MapError::InvalidLayer {
            name: layer.name.clone(),
            message: format!(
                "{} longitudes but {} latitudes",
                layer.x.len(),
                layer.y.len()
            ),
        });
    }

    let mut trace = json!({
        "type": "scattergl",
        "x": layer.x,
        "y": layer.y,
        "name": layer.name,
        "showlegend": layer.show_in_legend,
    });

    if let Some(group) = &layer.legend_group {
        trace["legendgroup"] = json!(group);
    }

    match &layer.hover {
        Some(hover) => trace["hovertemplate"] = json!(hover_template(hover)),
        None => trace["hoverinfo"] = json!("skip"),
    }

    match &layer.style {
        LayerStyle::Outline(style) => {
            trace["mode"] = json!("lines");
            trace["line"] = json!({ "color": style.line_color, "width": style.line_width });
            trace["fill"] = json!("toself");
            trace["fillcolor"] = json!(style.fill_color);
        }
        LayerStyle::Markers(style) => {
            trace["mode"] = json!("markers");
            trace["visible"] = json!(true);
            trace["marker"] = marker_json(style);
        }
        LayerStyle::Label(style) => {
            trace["mode"] = json!("markers+text");
            trace["marker"] = marker_json(&style.marker);
            trace["text"] = json!(layer.text);
            trace["textfont"] = json!({
                "size": style.font.size,
                "color": style.font.color,
                "family": style.font.family,
            });
            if let Some(anchor) = layer.text_anchor {
                trace["textposition"] = json!(anchor.to_string());
            }
        }
    }

    Ok(trace)
}

fn marker_json(style: &MarkerStyle) -> Value {
    let mut marker = json!({
        "size": style.size,
        "color": style.color,
        "opacity": style.opacity,
        "line": { "width": style.outline_width, "color": style.outline_color },
    });
    if let Some(symbol) = &style.symbol {
        marker["symbol"] = json!(symbol);
    }
    marker
}

/// Plotly hover template: bold title, then coordinates, no trace box.
fn hover_template(hover: &HoverTemplate) -> String {
    let p = hover.precision;
    format!(
        "<b>{}</b><br>Latitude: %{{y:.{p}f}}<br>Longitude: %{{x:.{p}f}}<br><extra></extra>",
        escape_html(&hover.title)
    )
}

fn layout_json(layout: &FigureLayout) -> Value {
    let mut y_axis = json!({
        "title": { "text": layout.y_axis_title },
        "showgrid": true,
        "gridcolor": layout.grid_color,
    });
    if layout.equal_aspect {
        y_axis["scaleanchor"] = json!("x");
        y_axis["scaleratio"] = json!(1);
    }

    json!({
        "title": {
            "text": layout.title,
            "font": {
                "size": layout.title_font.size,
                "color": layout.title_font.color,
                "family": layout.title_font.family,
            },
        },
        "xaxis": {
            "title": { "text": layout.x_axis_title },
            "showgrid": true,
            "gridcolor": layout.grid_color,
        },
        "yaxis": y_axis,
        "hovermode": "closest",
        "showlegend": true,
        "legend": {
            "xanchor": "left",
            "yanchor": "top",
            "x": layout.legend_position.0,
            "y": layout.legend_position.1,
            "bgcolor": layout.legend_background,
            "bordercolor": layout.legend_border_color,
            "borderwidth": 1,
            "itemsizing": "constant",
        },
        "width": layout.width,
        "height": layout.height,
        "plot_bgcolor": layout.plot_background,
    })
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
