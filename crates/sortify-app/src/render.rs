//! Terminal and JSON presentation sinks.

use std::io::{self, Write};

use serde::Serialize;
use sortify_classification_contract::Annotations;
use sortify_gauge::{MAX_ARC_LENGTH, Palette, VisualState};
use sortify_ui::{PanelStatus, PresentationSink};

const BAR_WIDTH: usize = 24;

/// Draws the gauge as text lines.
#[derive(Debug)]
pub struct TextGaugeSink<W: Write> {
    out: W,
    palette: Palette,
    error: Option<io::Error>,
}

impl<W: Write> TextGaugeSink<W> {
    /// Creates a sink writing to `out`.
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            out,
            palette,
            error: None,
        }
    }

    /// Returns the writer, or the first write error encountered.
    ///
    /// # Errors
    /// Returns the first I/O error raised while rendering.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_lines(&mut self, lines: &[String]) {
        if self.error.is_some() {
            return;
        }
        for line in lines {
            if let Err(error) = writeln!(self.out, "{line}") {
                self.error = Some(error);
                return;
            }
        }
    }
}

/// Renders a fill ratio as a fixed-width bar.
pub fn gauge_bar(fill_ratio: f64) -> String {
    let filled = ((fill_ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

impl<W: Write> PresentationSink for TextGaugeSink<W> {
    fn render(&mut self, state: &VisualState, annotations: &Annotations) {
        let swatch = self.palette.swatch(state.color);
        let lines = vec![
            format!("{} ({})", state.display_text, state.percent_text()),
            format!(
                "{} needle {:+.1} deg",
                gauge_bar(state.fill_ratio),
                state.angle_degrees
            ),
            format!(
                "badge {}  color {} {}",
                state.badge_tone().css_class(),
                state.color,
                swatch.solid
            ),
            format!("Sender:     {}", annotations.sender),
            format!("Links:      {}", annotations.links),
            format!("Content:    {}", annotations.content),
            format!("Attachment: {}", annotations.attachment),
        ];
        self.write_lines(&lines);
    }

    fn status(&mut self, status: PanelStatus) {
        if status.is_busy() {
            return;
        }
        self.write_lines(&[format!("Status: {status}")]);
    }
}

/// Serializable gauge snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeDocument {
    /// Category label.
    pub category: String,
    /// Badge text.
    pub display_text: String,
    /// Score in `[0, 1]`.
    pub normalized_score: f64,
    /// Rounded percentage text.
    pub percent: String,
    /// Needle angle.
    pub angle_degrees: f64,
    /// Arc fill ratio.
    pub fill_ratio: f64,
    /// Semantic color token.
    pub color: String,
    /// Solid color from the active palette.
    pub color_hex: String,
    /// Gradient stops from the active palette.
    pub gradient: [String; 3],
    /// Badge CSS class.
    pub badge_class: String,
    /// Arc `stroke-dashoffset`.
    pub dash_offset: f64,
    /// Full arc length.
    pub arc_length: f64,
    /// Needle `transform` attribute.
    pub needle_transform: String,
}

/// Serializable panel snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelDocument {
    /// Final status.
    pub status: PanelStatus,
    /// Status line text.
    pub message: String,
    /// Rendered gauge, if any.
    pub gauge: Option<GaugeDocument>,
    /// Rendered annotations, if any.
    pub annotations: Option<Annotations>,
}

/// Collects the final panel contents as one JSON document.
#[derive(Debug)]
pub struct JsonSink {
    palette: Palette,
    status: PanelStatus,
    gauge: Option<GaugeDocument>,
    annotations: Option<Annotations>,
}

impl JsonSink {
    /// Creates an empty sink.
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            status: PanelStatus::Idle,
            gauge: None,
            annotations: None,
        }
    }

    /// Snapshot of everything received so far.
    pub fn document(&self) -> PanelDocument {
        PanelDocument {
            status: self.status,
            message: self.status.message().to_string(),
            gauge: self.gauge.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl PresentationSink for JsonSink {
    fn render(&mut self, state: &VisualState, annotations: &Annotations) {
        let swatch = self.palette.swatch(state.color);
        let arc = state.arc();
        self.gauge = Some(GaugeDocument {
            category: state.category.to_string(),
            display_text: state.display_text.clone(),
            normalized_score: state.normalized_score,
            percent: state.percent_text(),
            angle_degrees: state.angle_degrees,
            fill_ratio: state.fill_ratio,
            color: state.color.to_string(),
            color_hex: swatch.solid.clone(),
            gradient: swatch.gradient.clone(),
            badge_class: state.badge_tone().css_class().to_string(),
            dash_offset: arc.dash_offset,
            arc_length: MAX_ARC_LENGTH,
            needle_transform: arc.needle_transform(),
        });
        self.annotations = Some(annotations.clone());
    }

    fn status(&mut self, status: PanelStatus) {
        self.status = status;
    }
}
