//! Reading-order reconstruction of PaddleOCR text boxes.
//!
//! PaddleOCR returns text boxes per page in an unreliable order. Lines are rebuilt
//! with a cheap greedy pass:
//!
//! 1. Sort boxes top to bottom by the y-coordinate of their *first* point.
//! 2. Walk the sorted boxes; start a new line whenever a box's vertical center
//!    (mean of its four y-coordinates) is more than [`LINE_TOLERANCE`] away from the
//!    previous box's center.
//! 3. Sort each line left to right by the x-coordinate of the first point.
//!
//! Only the first vertex is used as the ordering key, so strongly rotated or
//! perspective-skewed pages can split or merge lines incorrectly. Callers depend on
//! the resulting line boundaries, so the key must stay the first vertex rather than
//! the centroid.

use super::geometry::{Detection, Page};
use crate::text::normalize_spaces;
use crate::types::{ExtractionResult, Metadata};

/// Maximum vertical distance, in engine pixels, between boxes on the same line.
pub const LINE_TOLERANCE: f64 = 20.0;

/// Detections judged to form one visual line, in left-to-right order.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup<'a> {
    detections: Vec<&'a Detection>,
}

impl<'a> LineGroup<'a> {
    pub fn detections(&self) -> &[&'a Detection] {
        &self.detections
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Text of every non-empty box, each followed by one space.
    pub fn text(&self) -> String {
        let mut line = String::new();
        for detection in self.detections.iter().filter(|d| d.has_text()) {
            line.push_str(&detection.text);
            line.push(' ');
        }
        line
    }
}

/// Output of [`LineReconstructor::reconstruct`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructedText {
    /// Lines as emitted, before whitespace normalisation.
    pub raw: String,
    pub line_count: usize,
    pub confidence_sum: f64,
    /// Number of boxes that contributed text.
    pub confidence_count: usize,
}

impl ReconstructedText {
    /// Mean confidence over boxes with text; `None` when there were none.
    pub fn mean_confidence(&self) -> Option<f64> {
        (self.confidence_count > 0).then(|| self.confidence_sum / self.confidence_count as f64)
    }

    /// Text with whitespace runs collapsed and lines trimmed.
    pub fn content(&self) -> String {
        normalize_spaces(&self.raw)
    }

    /// Package as a plain-text extraction result for an image of the given size.
    pub fn into_extraction_result(self, width: u32, height: u32) -> ExtractionResult {
        let metadata = Metadata {
            width,
            height,
            confidence: self.mean_confidence(),
        };
        ExtractionResult::plain_text(self.content(), metadata)
    }
}

/// Groups text boxes into lines and emits them in reading order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineReconstructor {
    tolerance: f64,
}

impl Default for LineReconstructor {
    fn default() -> Self {
        Self {
            tolerance: LINE_TOLERANCE,
        }
    }
}

impl LineReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the line tolerance. Output differs from PaddleOCR's defaults when
    /// this is not [`LINE_TOLERANCE`].
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Cluster one page's detections into lines, top to bottom.
    pub fn group_lines<'a>(&self, detections: &'a [Detection]) -> Vec<LineGroup<'a>> {
        let mut sorted: Vec<&Detection> = detections.iter().collect();
        sorted.sort_by(|a, b| a.anchor().y.total_cmp(&b.anchor().y));

        let mut groups: Vec<LineGroup<'a>> = Vec::new();
        let mut current: Vec<&Detection> = Vec::new();
        let mut prev_y: Option<f64> = None;

        for detection in sorted {
            let current_y = detection.center_y();

            let starts_new_line = prev_y.is_none_or(|prev| (current_y - prev).abs() > self.tolerance);
            if starts_new_line && !current.is_empty() {
                groups.push(LineGroup {
                    detections: std::mem::take(&mut current),
                });
            }
            current.push(detection);

            prev_y = Some(current_y);
        }

        if !current.is_empty() {
            groups.push(LineGroup { detections: current });
        }

        for group in &mut groups {
            group.detections.sort_by(|a, b| a.anchor().x.total_cmp(&b.anchor().x));
        }

        groups
    }

    /// Rebuild text for every page, in page order.
    ///
    /// Missing and empty pages are skipped. Boxes with empty text still take part in
    /// line grouping but add neither text nor confidence.
    pub fn reconstruct(&self, pages: &[Page]) -> ReconstructedText {
        let mut output = ReconstructedText::default();

        for detections in pages.iter().flatten() {
            if detections.is_empty() {
                continue;
            }

            for line in self.group_lines(detections) {
                for detection in line.detections().iter().filter(|d| d.has_text()) {
                    output.confidence_sum += detection.confidence;
                    output.confidence_count += 1;
                }
                output.raw.push_str(&line.text());
                output.raw.push('\n');
                output.line_count += 1;
            }
        }

        tracing::trace!(
            lines = output.line_count,
            boxes = output.confidence_count,
            "Reconstructed OCR lines"
        );

        output
    }
}

/// Reconstruct with the default tolerance and build the extraction result.
pub fn reconstruct_result(pages: &[Page], width: u32, height: u32) -> ExtractionResult {
    LineReconstructor::default()
        .reconstruct(pages)
        .into_extraction_result(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::geometry::Point;

    fn word(x: f64, y: f64, text: &str, confidence: f64) -> Detection {
        Detection::from_rect(x, y, 30.0, 20.0, text, confidence)
    }

    #[test]
    fn test_reference_scenario() {
        let page = vec![word(50.0, 100.0, "B", 0.9), word(10.0, 102.0, "A", 0.8), word(5.0, 130.0, "C", 0.7)];
        let result = LineReconstructor::new().reconstruct(&[Some(page)]);

        assert_eq!(result.raw, "A B \nC \n");
        assert_eq!(result.content(), "A B\nC");
        assert_eq!(result.line_count, 2);
        assert_eq!(result.confidence_count, 3);
        let mean = result.mean_confidence().unwrap();
        assert!((mean - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_each_distant_box_is_its_own_line() {
        let page: Vec<Detection> = (0..6)
            .map(|i| word(0.0, i as f64 * 25.0, &format!("w{i}"), 0.5))
            .collect();
        let reconstructor = LineReconstructor::new();
        assert_eq!(reconstructor.group_lines(&page).len(), page.len());

        let result = reconstructor.reconstruct(&[Some(page)]);
        assert_eq!(result.raw, "w0 \nw1 \nw2 \nw3 \nw4 \nw5 \n");
    }

    #[test]
    fn test_same_line_sorted_by_x_regardless_of_input_order() {
        let xs = [300.0, 20.0, 150.0, 75.0];
        let page: Vec<Detection> = xs.iter().map(|&x| word(x, 50.0, &format!("{x}"), 1.0)).collect();

        let lines = LineReconstructor::new().group_lines(&page);
        assert_eq!(lines.len(), 1);
        let order: Vec<f64> = lines[0].detections().iter().map(|d| d.anchor().x).collect();
        assert_eq!(order, vec![20.0, 75.0, 150.0, 300.0]);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let page = vec![word(0.0, 0.0, "a", 1.0), word(10.0, 20.0, "b", 1.0), word(0.0, 40.5, "c", 1.0)];
        let lines = LineReconstructor::new().group_lines(&page);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 1);
    }

    #[test]
    fn test_chained_boxes_share_a_line() {
        // Each box is within tolerance of the previous one, not of the first.
        let page = vec![word(0.0, 0.0, "a", 1.0), word(40.0, 15.0, "b", 1.0), word(80.0, 30.0, "c", 1.0)];
        let lines = LineReconstructor::new().group_lines(&page);
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_empty_text_splits_lines_without_contributing() {
        let page = vec![word(0.0, 0.0, "top", 0.9), word(0.0, 25.0, "", 0.1), word(0.0, 50.0, "bottom", 0.7)];
        let result = LineReconstructor::new().reconstruct(&[Some(page)]);

        assert_eq!(result.raw, "top \n\nbottom \n");
        assert_eq!(result.line_count, 3);
        assert_eq!(result.confidence_count, 2);
        assert!((result.mean_confidence().unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(result.content(), "top\n\nbottom");
    }

    #[test]
    fn test_all_empty_text_has_no_confidence() {
        let page = vec![word(0.0, 0.0, "", 0.9), word(50.0, 0.0, "", 0.8)];
        let result = LineReconstructor::new().reconstruct(&[Some(page)]);
        assert_eq!(result.confidence_count, 0);
        assert_eq!(result.mean_confidence(), None);
        assert_eq!(result.content(), "");
    }

    #[test]
    fn test_missing_and_empty_pages_are_skipped() {
        let pages = vec![None, Some(vec![]), Some(vec![word(0.0, 0.0, "only", 0.6)]), None];
        let result = LineReconstructor::new().reconstruct(&pages);
        assert_eq!(result.raw, "only \n");
        assert_eq!(result.line_count, 1);

        let nothing = LineReconstructor::new().reconstruct(&[]);
        assert_eq!(nothing, ReconstructedText::default());
    }

    #[test]
    fn test_pages_concatenate_in_order() {
        let pages = vec![
            Some(vec![word(0.0, 500.0, "first", 1.0)]),
            Some(vec![word(0.0, 0.0, "second", 1.0)]),
        ];
        let result = LineReconstructor::new().reconstruct(&pages);
        assert_eq!(result.content(), "first\nsecond");
    }

    #[test]
    fn test_sort_uses_first_vertex_not_centroid() {
        // Box "low" has a higher first point but a lower center than "high".
        let low = Detection::new(
            [
                Point::new(0.0, 0.0),
                Point::new(40.0, 0.0),
                Point::new(40.0, 100.0),
                Point::new(0.0, 100.0),
            ],
            "low",
            1.0,
        );
        let high = Detection::from_rect(100.0, 10.0, 40.0, 10.0, "high", 1.0);
        let page = vec![high, low];

        let lines = LineReconstructor::new().group_lines(&page);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].detections()[0].text, "low");
        assert_eq!(lines[1].detections()[0].text, "high");
    }

    #[test]
    fn test_custom_tolerance() {
        let page = vec![word(0.0, 0.0, "a", 1.0), word(40.0, 30.0, "b", 1.0)];
        assert_eq!(LineReconstructor::new().group_lines(&page).len(), 2);
        assert_eq!(LineReconstructor::with_tolerance(50.0).group_lines(&page).len(), 1);
    }

    #[test]
    fn test_reconstruct_result_metadata() {
        let page = vec![word(0.0, 0.0, "hello", 0.5), word(40.0, 0.0, "world", 1.0)];
        let result = reconstruct_result(&[Some(page)], 800, 600);

        assert_eq!(result.content, "hello world");
        assert_eq!(result.mime_type, "text/plain");
        assert_eq!(result.metadata.width, 800);
        assert_eq!(result.metadata.height, 600);
        assert_eq!(result.metadata.confidence, Some(0.75));
        assert!(result.chunks.is_empty());
    }
}
