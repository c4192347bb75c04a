//! Editing session
//!
//! Owns the draft, layout, calibration and font, applies edits and pointer
//! gestures, and writes every change straight back to the store.

use crate::document::Document;
use crate::export::{ExportArtifact, ExportError, ExportInputs, ExportOptions, Exporter};
use crate::geometry::{Calibration, PixelScale};
use crate::gesture::{LayoutCommit, LiveDelta, PointerPos, PointerTarget, PositioningEngine};
use crate::keys::{Column, FieldKey, PageField};
use crate::layout::LayoutConfig;
use crate::settings::Settings;
use crate::store::KvStore;
use crate::style::{FontSpec, StyleProperty};
use crate::view::{build_page_view, build_print_view, PageView};
use serde::Deserialize;
use tracing::{debug, info};

/// A key press as the host reports it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct KeyInput {
    pub key: String,
    #[serde(default, rename = "ctrlKey")]
    pub ctrl: bool,
    #[serde(default, rename = "metaKey")]
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool, meta: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
            meta,
        }
    }

    fn is_remove_row(&self) -> bool {
        self.key == "Backspace" && (self.ctrl || self.meta)
    }
}

pub struct Editor<S: KvStore> {
    settings: Settings<S>,
    document: Document,
    layout: LayoutConfig,
    calibration: Calibration,
    font: FontSpec,
    engine: PositioningEngine,
    /// Row holding keyboard focus as (page, row)
    active_row: Option<(usize, usize)>,
    exporter: Exporter,
}

impl<S: KvStore> Editor<S> {
    /// Restore the session saved in `store`
    pub fn open(store: S) -> Self {
        let settings = Settings::new(store);
        Self {
            document: settings.load_draft(),
            layout: settings.load_layout(),
            calibration: settings.load_calibration(),
            font: settings.load_font(),
            settings,
            engine: PositioningEngine::default(),
            active_row: None,
            exporter: Exporter::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Committed layout
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn store(&self) -> &S {
        self.settings.store()
    }

    pub fn into_store(self) -> S {
        self.settings.into_store()
    }

    // Document edits

    pub fn update_field(&mut self, page: usize, field: PageField, value: &str) {
        let next = self.document.update_header_field(page, field, value);
        self.commit_document(next);
    }

    pub fn update_line_item(&mut self, page: usize, row: usize, column: Column, value: &str) {
        let next = self.document.update_line_item(page, row, column, value);
        self.commit_document(next);
    }

    pub fn add_row(&mut self, page: usize) {
        let next = self.document.add_row(page);
        self.commit_document(next);
    }

    pub fn remove_row(&mut self, page: usize, row: usize) {
        let next = self.document.remove_row(page, row);
        // rows below shift up, so a held index would point at another row
        self.active_row = None;
        self.commit_document(next);
    }

    pub fn add_page(&mut self) {
        let next = self.document.add_page();
        self.commit_document(next);
    }

    /// Remove a page, keeping at least one
    pub fn remove_page(&mut self, page: usize) {
        if self.document.page_count() <= 1 {
            debug!(page, "last page kept");
            return;
        }
        let next = self.document.remove_page(page);
        self.active_row = None;
        self.commit_document(next);
    }

    /// Replace the draft with a single empty page
    pub fn clear_all(&mut self) {
        let next = self.document.cleared();
        self.active_row = None;
        self.commit_document(next);
        info!("draft cleared");
    }

    pub fn set_field_style(&mut self, page: usize, key: FieldKey, property: StyleProperty) {
        let next = self.document.set_field_style(page, key, property);
        self.commit_document(next);
    }

    pub fn clear_field_style(&mut self, page: usize, key: FieldKey) {
        let next = self.document.clear_field_style(page, key);
        self.commit_document(next);
    }

    fn commit_document(&mut self, next: Document) {
        self.document = next;
        self.settings.save_draft(&self.document);
    }

    // Keyboard focus

    pub fn focus_row(&mut self, page: usize, row: usize) {
        self.active_row = Some((page, row));
    }

    pub fn blur_row(&mut self) {
        self.active_row = None;
    }

    pub fn active_row(&self) -> Option<(usize, usize)> {
        self.active_row
    }

    /// Handle a shortcut; returns whether the key was consumed
    ///
    /// Ctrl/Cmd+Backspace removes the focused row outside drag mode.
    pub fn handle_key(&mut self, input: &KeyInput) -> bool {
        if self.engine.drag_mode() || !input.is_remove_row() {
            return false;
        }
        match self.active_row {
            Some((page, row)) => {
                self.remove_row(page, row);
                true
            }
            None => false,
        }
    }

    // Settings

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
        self.settings.save_calibration(&self.calibration);
    }

    pub fn set_font(&mut self, font: FontSpec) {
        self.font = font;
        self.settings.save_font(&self.font);
    }

    /// Change one property of the global font
    pub fn set_font_property(&mut self, property: StyleProperty) {
        let font = self.font.clone().with(property);
        self.set_font(font);
    }

    /// Drop the layout override and go back to the shipped positions
    pub fn reset_layout(&mut self) {
        self.layout = self.settings.reset_layout();
    }

    /// Apply a layout change directly, outside any gesture
    pub fn apply_commit(&mut self, commit: LayoutCommit) {
        let next = commit.apply(&self.layout);
        if next == self.layout {
            debug!(?commit, "layout unchanged");
            return;
        }
        self.layout = next;
        self.settings.save_layout(&self.layout);
    }

    // Positioning

    pub fn drag_mode(&self) -> bool {
        self.engine.drag_mode()
    }

    pub fn set_drag_mode(&mut self, on: bool) {
        self.engine.set_drag_mode(on);
    }

    /// Update the pixel scale after the page was laid out again
    pub fn set_rendered_size(&mut self, width_px: f64, height_px: f64) {
        self.engine
            .set_scale(PixelScale::from_rendered_page(width_px, height_px));
    }

    pub fn engine(&self) -> &PositioningEngine {
        &self.engine
    }

    pub fn pointer_down(&mut self, target: PointerTarget, at: PointerPos) -> bool {
        self.engine.pointer_down(target, at)
    }

    pub fn pointer_move(&mut self, at: PointerPos) -> Option<LiveDelta> {
        self.engine.pointer_move(at)
    }

    /// Finish the gesture and persist its commit
    pub fn pointer_up(&mut self) -> Option<LayoutCommit> {
        let commit = self.engine.pointer_up()?;
        self.apply_commit(commit);
        Some(commit)
    }

    /// Layout to draw with, including an in-flight gesture
    pub fn preview_layout(&self) -> LayoutConfig {
        self.engine.preview(&self.layout)
    }

    // Views

    pub fn page_view(&self, page: usize) -> Option<PageView> {
        let layout = self.preview_layout();
        self.document.page(page).map(|p| {
            build_page_view(
                page,
                p,
                &layout,
                &self.calibration,
                &self.font,
                self.engine.drag_mode(),
            )
        })
    }

    pub fn page_views(&self) -> Vec<PageView> {
        let layout = self.preview_layout();
        self.document
            .pages()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                build_page_view(
                    i,
                    p,
                    &layout,
                    &self.calibration,
                    &self.font,
                    self.engine.drag_mode(),
                )
            })
            .collect()
    }

    pub fn print_views(&self) -> Vec<PageView> {
        self.document
            .pages()
            .iter()
            .enumerate()
            .map(|(i, p)| build_print_view(i, p, &self.layout, &self.calibration, &self.font))
            .collect()
    }

    // Export

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    /// Render the draft over `background` into a PDF
    pub fn export(
        &self,
        background: &[u8],
        options: &ExportOptions,
    ) -> Result<ExportArtifact, ExportError> {
        let inputs = ExportInputs {
            document: &self.document,
            layout: &self.layout,
            calibration: &self.calibration,
            font: &self.font,
            background,
        };
        self.exporter.export(&inputs, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::HeaderField;
    use crate::layout::DEFAULT_LAYOUT;
    use crate::settings::{DRAFT_KEY, LAYOUT_KEY};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn editor() -> Editor<MemoryStore> {
        Editor::open(MemoryStore::new())
    }

    #[test]
    fn test_edits_persist_immediately() {
        let mut ed = editor();
        ed.update_field(0, PageField::Header(HeaderField::Ms), "Acme Mills");
        ed.add_row(0);

        let reopened = Editor::open(ed.into_store());
        let page = reopened.document().page(0).unwrap();
        assert_eq!(page.ms, "Acme Mills");
        assert_eq!(page.line_items.len(), 2);
    }

    #[test]
    fn test_last_page_is_kept() {
        let mut ed = editor();
        ed.remove_page(0);
        assert_eq!(ed.document().page_count(), 1);

        ed.add_page();
        ed.update_field(1, PageField::Header(HeaderField::BillNo), "2");
        ed.remove_page(0);
        assert_eq!(ed.document().page_count(), 1);
        assert_eq!(ed.document().page(0).unwrap().bill_no, "2");
    }

    #[test]
    fn test_ctrl_backspace_removes_focused_row() {
        let mut ed = editor();
        ed.add_row(0);
        ed.update_line_item(0, 1, Column::Particulars, "Bolts");

        assert!(!ed.handle_key(&KeyInput::new("Backspace", true, false)));

        ed.focus_row(0, 0);
        assert!(!ed.handle_key(&KeyInput::new("Backspace", false, false)));
        assert!(ed.handle_key(&KeyInput::new("Backspace", false, true)));

        let page = ed.document().page(0).unwrap();
        assert_eq!(page.line_items.len(), 1);
        assert_eq!(page.line_items[0].particulars, "Bolts");
        assert_eq!(page.line_items[0].sno, "1");
        assert_eq!(ed.active_row(), None);
    }

    fn particulars(ed: &Editor<MemoryStore>) -> Vec<String> {
        ed.document().page(0).unwrap().line_items.iter().map(|i| i.particulars.clone()).collect()
    }

    #[test]
    fn test_removing_another_row_drops_focus() {
        let mut ed = editor();
        ed.add_row(0);
        ed.add_row(0);
        for (row, name) in ["A", "B", "C"].into_iter().enumerate() {
            ed.update_line_item(0, row, Column::Particulars, name);
        }

        ed.focus_row(0, 1);
        ed.remove_row(0, 0);
        assert_eq!(ed.active_row(), None);

        assert!(!ed.handle_key(&KeyInput::new("Backspace", true, false)));
        assert_eq!(particulars(&ed), vec!["B", "C"]);
    }

    #[test]
    fn test_removing_a_page_drops_focus() {
        let mut ed = editor();
        ed.add_page();
        ed.focus_row(1, 0);
        ed.remove_page(0);
        assert_eq!(ed.active_row(), None);
        assert!(!ed.handle_key(&KeyInput::new("Backspace", true, false)));
        assert_eq!(ed.document().page(0).unwrap().line_items.len(), 1);
    }

    #[test]
    fn test_remove_row_renumbers_loaded_serials() {
        let mut ed = editor();
        ed.add_row(0);
        ed.add_row(0);
        for (row, sno) in ["7", "9a", "12"].into_iter().enumerate() {
            ed.update_line_item(0, row, Column::Sno, sno);
            ed.update_line_item(0, row, Column::Particulars, sno);
        }

        let mut reopened = Editor::open(ed.into_store());
        let snos: Vec<_> = reopened.document().page(0).unwrap().line_items.iter().map(|i| i.sno.clone()).collect();
        assert_eq!(snos, vec!["7", "9a", "12"]);

        reopened.remove_row(0, 1);
        let page = reopened.document().page(0).unwrap();
        let snos: Vec<_> = page.line_items.iter().map(|i| i.sno.clone()).collect();
        assert_eq!(snos, vec!["1", "2"]);
        assert_eq!(particulars(&reopened), vec!["7", "12"]);
    }

    #[test]
    fn test_shortcut_ignored_in_drag_mode() {
        let mut ed = editor();
        ed.add_row(0);
        ed.focus_row(0, 1);
        ed.set_drag_mode(true);
        assert!(!ed.handle_key(&KeyInput::new("Backspace", true, false)));
        assert_eq!(ed.document().page(0).unwrap().line_items.len(), 2);
    }

    #[test]
    fn test_gesture_commits_and_persists_layout() {
        let mut ed = editor();
        ed.set_rendered_size(420.0, 594.0);
        ed.set_drag_mode(true);

        let key = FieldKey::Header(HeaderField::Date);
        assert!(ed.pointer_down(PointerTarget::Field(key), PointerPos::new(100.0, 100.0)));
        ed.pointer_move(PointerPos::new(104.0, 101.0));
        ed.pointer_move(PointerPos::new(110.0, 103.0));

        // preview moves, committed layout does not
        assert_eq!(ed.layout(), &DEFAULT_LAYOUT);
        assert!((ed.preview_layout().date.left - (84.7 + 5.0)).abs() < 1e-9);

        let commit = ed.pointer_up().unwrap();
        assert_eq!(
            commit,
            LayoutCommit::Move {
                key,
                d_left: 5.0,
                d_top: 1.5
            }
        );
        assert_eq!(ed.layout().date.left, 89.7);
        assert_eq!(ed.layout().date.top, 59.2);

        let reopened = Editor::open(ed.into_store());
        assert_eq!(reopened.layout().date.left, 89.7);
    }

    #[test]
    fn test_zero_gesture_is_not_persisted() {
        let mut ed = editor();
        ed.set_drag_mode(true);
        ed.pointer_down(PointerTarget::RowHeightHandle, PointerPos::new(5.0, 5.0));
        let commit = ed.pointer_up().unwrap();
        assert!(commit.is_zero());
        assert_eq!(ed.store().get(LAYOUT_KEY).unwrap(), None);
    }

    #[test]
    fn test_reset_layout() {
        let mut ed = editor();
        ed.apply_commit(LayoutCommit::Resize {
            key: FieldKey::RowHeight,
            delta: -10.0,
        });
        assert_eq!(ed.layout().line_items.row_height, 5.0);

        ed.reset_layout();
        assert_eq!(ed.layout(), &DEFAULT_LAYOUT);
        assert_eq!(Editor::open(ed.into_store()).layout(), &DEFAULT_LAYOUT);
    }

    #[test]
    fn test_font_and_calibration_persist() {
        let mut ed = editor();
        ed.set_font_property(StyleProperty::Family("Georgia".to_string()));
        ed.set_font_property(StyleProperty::Size(13.0));
        ed.set_calibration(Calibration::new(-2.5, 1.0));

        let reopened = Editor::open(ed.into_store());
        assert_eq!(reopened.font().family, "Georgia");
        assert_eq!(reopened.font().size, 13.0);
        assert_eq!(reopened.calibration(), Calibration::new(-2.5, 1.0));
    }

    #[test]
    fn test_clear_all() {
        let mut ed = editor();
        ed.add_page();
        ed.update_field(0, PageField::Header(HeaderField::BillNo), "9");
        ed.clear_all();
        assert_eq!(ed.document(), &Document::new());
        assert!(ed.store().get(DRAFT_KEY).unwrap().is_some());
    }

    #[test]
    fn test_views_follow_pages_and_drag_mode() {
        let mut ed = editor();
        ed.add_page();
        let views = ed.page_views();
        assert_eq!(views.len(), 2);
        assert!(!views[0].continued);
        assert!(views[1].continued);
        assert!(views[0].handles.is_empty());

        ed.set_drag_mode(true);
        assert!(!ed.page_view(0).unwrap().handles.is_empty());
        assert!(ed.page_view(5).is_none());
        assert!(ed.print_views().iter().all(|v| v.handles.is_empty()));
    }
}
