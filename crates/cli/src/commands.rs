//! Command execution
//!
//! Every command opens the session from the state directory, applies one
//! change and returns the text to print. Pages and rows are numbered from 1
//! on the command line.

use crate::{CalibrateArgs, Cli, Commands, FontArgs, LayoutAction};
use anyhow::{bail, ensure, Context, Result};
use invoice_form::{
    Calibration, Column, Editor, ExportOptions, FieldKey, FileStore, KvStore, LayoutCommit,
    LayoutSource, PageField, StyleProperty, FONT_FAMILIES,
};
use std::fmt::Write as _;
use tracing::info;

pub fn run(cli: Cli) -> Result<String> {
    if let Commands::Words { rupees, paise } = &cli.command {
        return Ok(rupee_text::amount_to_words(rupees, paise));
    }

    let store = FileStore::open(&cli.state)
        .with_context(|| format!("cannot open state directory {}", cli.state.display()))?;
    let mut editor = Editor::open(store);
    execute(&mut editor, cli.command)
}

fn execute<S: KvStore>(editor: &mut Editor<S>, command: Commands) -> Result<String> {
    match command {
        Commands::Words { rupees, paise } => Ok(rupee_text::amount_to_words(&rupees, &paise)),

        Commands::Show { json } => {
            if json {
                Ok(serde_json::to_string_pretty(editor.document())?)
            } else {
                render_draft(editor)
            }
        }

        Commands::Set { page, field, value } => {
            let page = page_index(editor, page)?;
            let field: PageField = field.parse()?;
            editor.update_field(page, field, &value);
            Ok(String::new())
        }

        Commands::Item {
            page,
            row,
            column,
            value,
        } => {
            let page = page_index(editor, page)?;
            let row = row_index(editor, page, row)?;
            let column: Column = column.parse()?;
            editor.update_line_item(page, row, column, &value);
            Ok(line_summary(editor, page, row))
        }

        Commands::AddRow { page } => {
            let page = page_index(editor, page)?;
            let before = rows(editor, page);
            editor.add_row(page);
            ensure!(
                rows(editor, page) > before,
                "page {} already has {} rows",
                page + 1,
                invoice_form::MAX_ROWS
            );
            Ok(format!("page {} now has {} rows", page + 1, rows(editor, page)))
        }

        Commands::RemoveRow { page, row } => {
            let page = page_index(editor, page)?;
            let row = row_index(editor, page, row)?;
            editor.remove_row(page, row);
            Ok(format!("page {} now has {} rows", page + 1, rows(editor, page)))
        }

        Commands::AddPage => {
            editor.add_page();
            Ok(format!("{} pages", editor.document().page_count()))
        }

        Commands::RemovePage { page } => {
            let page = page_index(editor, page)?;
            ensure!(
                editor.document().page_count() > 1,
                "the only page cannot be removed"
            );
            editor.remove_page(page);
            Ok(format!("{} pages", editor.document().page_count()))
        }

        Commands::Clear => {
            editor.clear_all();
            Ok("draft cleared".to_string())
        }

        Commands::Layout { action } => layout(editor, action),

        Commands::Calibrate(args) => calibrate(editor, args),

        Commands::Font(args) => font(editor, args),

        Commands::Style {
            page,
            key,
            property,
            value,
            clear,
        } => {
            let page = page_index(editor, page)?;
            let key: FieldKey = key.parse()?;
            if clear {
                editor.clear_field_style(page, key);
                return Ok(format!("{key}: default font"));
            }
            let (Some(property), Some(value)) = (property, value) else {
                bail!("style needs a property and a value, or --clear");
            };
            editor.set_field_style(page, key, StyleProperty::parse(&property, &value)?);
            let style = editor
                .document()
                .field_style(page, key)
                .map(serde_json::to_string)
                .transpose()?
                .unwrap_or_default();
            Ok(format!("{key}: {style}"))
        }

        Commands::Export {
            background,
            out,
            default_layout,
        } => {
            let bytes = std::fs::read(&background)
                .with_context(|| format!("cannot read background {}", background.display()))?;
            let options = ExportOptions {
                layout_source: if default_layout {
                    LayoutSource::Defaults
                } else {
                    LayoutSource::Stored
                },
                ..ExportOptions::default()
            };
            let artifact = editor.export(&bytes, &options)?;
            let path = artifact
                .write_to_dir(&out)
                .with_context(|| format!("cannot write into {}", out.display()))?;
            info!(path = %path.display(), "pdf written");
            Ok(path.display().to_string())
        }
    }
}

fn layout<S: KvStore>(editor: &mut Editor<S>, action: LayoutAction) -> Result<String> {
    match action {
        LayoutAction::Show { json } => {
            if json {
                return Ok(serde_json::to_string_pretty(editor.layout())?);
            }
            let layout = editor.layout();
            let mut out = String::new();
            for key in FieldKey::positioned() {
                if let Some(g) = layout.field(key) {
                    writeln!(
                        out,
                        "{:<20} left {:>6.1}  top {:>6.1}  width {:>6.1}",
                        key.label(),
                        g.left,
                        g.top,
                        g.width
                    )?;
                }
            }
            let table = &layout.line_items;
            for column in Column::ALL {
                let g = table.columns.get(column);
                writeln!(
                    out,
                    "{:<20} left {:>6.1}  width {:>6.1}",
                    FieldKey::Column(column).label(),
                    g.left,
                    g.width
                )?;
            }
            write!(
                out,
                "{:<20} first row {:.1}  height {:.1}",
                FieldKey::RowHeight.label(),
                table.first_row_top,
                table.row_height
            )?;
            Ok(out)
        }
        LayoutAction::Move { key, d_left, d_top } => {
            let key: FieldKey = key.parse()?;
            ensure!(key != FieldKey::RowHeight, "row_height cannot be moved, resize it");
            editor.apply_commit(LayoutCommit::Move { key, d_left, d_top });
            Ok(describe_key(editor, key))
        }
        LayoutAction::Resize { key, delta } => {
            let key: FieldKey = key.parse()?;
            editor.apply_commit(LayoutCommit::Resize { key, delta });
            Ok(describe_key(editor, key))
        }
        LayoutAction::Reset => {
            editor.reset_layout();
            Ok("layout reset to defaults".to_string())
        }
    }
}

fn calibrate<S: KvStore>(editor: &mut Editor<S>, args: CalibrateArgs) -> Result<String> {
    let calibration = if args.reset {
        Calibration::default()
    } else {
        let current = editor.calibration();
        Calibration::new(
            args.top.unwrap_or(current.top),
            args.left.unwrap_or(current.left),
        )
        .clamped()
    };
    editor.set_calibration(calibration);
    Ok(format!(
        "calibration top {:+.1} mm, left {:+.1} mm",
        calibration.top, calibration.left
    ))
}

fn font<S: KvStore>(editor: &mut Editor<S>, args: FontArgs) -> Result<String> {
    let mut font = editor.font().clone();
    if let Some(family) = args.family {
        ensure!(
            FONT_FAMILIES.contains(&family.as_str()),
            "unknown font family '{family}', choose one of: {}",
            FONT_FAMILIES.join(", ")
        );
        font = font.with(StyleProperty::Family(family));
    }
    if let Some(size) = args.size {
        font = font.with(StyleProperty::Size(f32::from(size)));
    }
    if let Some(bold) = args.bold {
        font = font.with(StyleProperty::Bold(bold));
    }
    if let Some(italic) = args.italic {
        font = font.with(StyleProperty::Italic(italic));
    }
    editor.set_font(font.validated()?);

    let font = editor.font();
    Ok(format!(
        "{} {}pt{}{}",
        font.family,
        font.size,
        if font.bold { " bold" } else { "" },
        if font.italic { " italic" } else { "" }
    ))
}

fn page_index<S: KvStore>(editor: &Editor<S>, page: usize) -> Result<usize> {
    let count = editor.document().page_count();
    ensure!(
        (1..=count).contains(&page),
        "page {page} does not exist (draft has {count})"
    );
    Ok(page - 1)
}

fn row_index<S: KvStore>(editor: &Editor<S>, page: usize, row: usize) -> Result<usize> {
    let count = rows(editor, page);
    ensure!(
        (1..=count).contains(&row),
        "row {row} does not exist (page {} has {count})",
        page + 1
    );
    Ok(row - 1)
}

fn rows<S: KvStore>(editor: &Editor<S>, page: usize) -> usize {
    editor
        .document()
        .page(page)
        .map_or(0, |p| p.line_items.len())
}

fn line_summary<S: KvStore>(editor: &Editor<S>, page: usize, row: usize) -> String {
    let Some(p) = editor.document().page(page) else {
        return String::new();
    };
    let Some(item) = p.line_items.get(row) else {
        return String::new();
    };
    format!(
        "row {}: {} x {} = {}.{:0>2}  (page total {}.{:0>2})",
        row + 1,
        item.qty,
        item.rate,
        or_zero(&item.amount_rs),
        item.amount_p,
        or_zero(&p.total_rs),
        p.total_p
    )
}

fn describe_key<S: KvStore>(editor: &Editor<S>, key: FieldKey) -> String {
    let layout = editor.layout();
    match key {
        FieldKey::RowHeight => format!("row height {:.1}", layout.line_items.row_height),
        FieldKey::Column(column) => {
            let g = layout.column(column);
            format!(
                "{}: left {:.1}, width {:.1}, first row {:.1}",
                key,
                g.left,
                g.width,
                layout.line_items.first_row_top
            )
        }
        _ => match layout.field(key) {
            Some(g) => format!("{}: left {:.1}, top {:.1}, width {:.1}", key, g.left, g.top, g.width),
            None => key.to_string(),
        },
    }
}

fn or_zero(value: &str) -> &str {
    if value.is_empty() {
        "0"
    } else {
        value
    }
}

fn render_draft<S: KvStore>(editor: &Editor<S>) -> Result<String> {
    let mut out = String::new();
    for (index, page) in editor.document().pages().iter().enumerate() {
        writeln!(
            out,
            "Page {}{}",
            index + 1,
            if index > 0 { " (Continued)" } else { "" }
        )?;
        for field in invoice_form::HeaderField::ALL {
            let value = page.header(field);
            if !value.is_empty() {
                writeln!(out, "  {:<18} {}", field.label(), value)?;
            }
        }
        for item in &page.line_items {
            writeln!(
                out,
                "  {:>3}. {:<40} {:>8} {:>10} {:>10}.{:0>2}",
                item.sno,
                item.particulars,
                item.qty,
                item.rate,
                or_zero(&item.amount_rs),
                item.amount_p
            )?;
        }
        let total = rupee_text::parse_amount_or_zero(&page.total_rs)
            + rupee_text::parse_amount_or_zero(&page.total_p) / 100.0;
        writeln!(out, "  Total Rs {}", rupee_text::format_indian(total, 2))?;
        if !page.amount_words.is_empty() {
            writeln!(out, "  {}", page.amount_words)?;
        }
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use invoice_form::MemoryStore;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Commands {
        let mut argv = vec!["invoice-form"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    fn exec(editor: &mut Editor<MemoryStore>, args: &[&str]) -> Result<String> {
        execute(editor, parse(args))
    }

    #[test]
    fn test_words() {
        let mut editor = Editor::open(MemoryStore::new());
        assert_eq!(
            exec(&mut editor, &["words", "100000", "5"]).unwrap(),
            "Rupees One Lakh and Five Paise Only"
        );
        assert_eq!(exec(&mut editor, &["words", "0"]).unwrap(), "");
    }

    #[test]
    fn test_fill_a_row() {
        let mut editor = Editor::open(MemoryStore::new());
        exec(&mut editor, &["set", "1", "billNo", "SE-9"]).unwrap();
        exec(&mut editor, &["item", "1", "1", "qty", "3"]).unwrap();
        let summary = exec(&mut editor, &["item", "1", "1", "rate", "10.5"]).unwrap();
        assert_eq!(summary, "row 1: 3 x 10.5 = 31.50  (page total 31.50)");

        let shown = exec(&mut editor, &["show"]).unwrap();
        assert!(shown.contains("SE-9"));
        assert!(shown.contains("Total Rs 31.50"));
        assert!(shown.contains("Rupees Thirty One and Fifty Paise Only"));
    }

    #[test]
    fn test_show_lists_every_page() {
        let mut editor = Editor::open(MemoryStore::new());
        exec(&mut editor, &["add-page"]).unwrap();
        exec(&mut editor, &["item", "2", "1", "particulars", "Nuts"]).unwrap();

        let shown = render_draft(&editor).unwrap();
        let lines: Vec<&str> = shown.lines().collect();
        assert_eq!(lines[0], "Page 1");
        assert!(lines.contains(&"Page 2 (Continued)"));
        assert!(shown.contains("Nuts"));
        assert!(!shown.ends_with('\n'));
    }

    #[test]
    fn test_indices_are_checked() {
        let mut editor = Editor::open(MemoryStore::new());
        assert!(exec(&mut editor, &["set", "0", "billNo", "1"]).is_err());
        assert!(exec(&mut editor, &["set", "2", "billNo", "1"]).is_err());
        assert!(exec(&mut editor, &["item", "1", "2", "qty", "1"]).is_err());
        assert!(exec(&mut editor, &["set", "1", "colour", "red"]).is_err());
        assert!(exec(&mut editor, &["remove-page", "1"]).is_err());
    }

    #[test]
    fn test_row_limit() {
        let mut editor = Editor::open(MemoryStore::new());
        for _ in 1..invoice_form::MAX_ROWS {
            exec(&mut editor, &["add-row", "1"]).unwrap();
        }
        assert!(exec(&mut editor, &["add-row", "1"]).is_err());
        assert_eq!(rows(&editor, 0), invoice_form::MAX_ROWS);
    }

    #[test]
    fn test_layout_commands() {
        let mut editor = Editor::open(MemoryStore::new());
        let moved = exec(&mut editor, &["layout", "move", "billNo", "1.5", "-0.5"]).unwrap();
        assert_eq!(moved, "billNo: left 32.6, top 58.0, width 37.0");

        let resized = exec(&mut editor, &["layout", "resize", "row_height", "-9"]).unwrap();
        assert_eq!(resized, "row height 5.0");

        assert!(exec(&mut editor, &["layout", "move", "row_height", "1", "1"]).is_err());

        exec(&mut editor, &["layout", "reset"]).unwrap();
        assert_eq!(editor.layout(), &invoice_form::DEFAULT_LAYOUT);
    }

    #[test]
    fn test_calibrate_clamps() {
        let mut editor = Editor::open(MemoryStore::new());
        let out = exec(&mut editor, &["calibrate", "--top", "25", "--left", "-1.3"]).unwrap();
        assert_eq!(out, "calibration top +20.0 mm, left -1.5 mm");

        exec(&mut editor, &["calibrate", "--left", "2"]).unwrap();
        assert_eq!(editor.calibration(), Calibration::new(20.0, 2.0));

        exec(&mut editor, &["calibrate", "--reset"]).unwrap();
        assert_eq!(editor.calibration(), Calibration::default());
    }

    #[test]
    fn test_font_and_style() {
        let mut editor = Editor::open(MemoryStore::new());
        let out = exec(
            &mut editor,
            &["font", "--family", "Georgia", "--size", "12", "--bold", "true"],
        )
        .unwrap();
        assert_eq!(out, "Georgia 12pt bold");
        assert!(exec(&mut editor, &["font", "--family", "Papyrus"]).is_err());
        assert!(Cli::try_parse_from(["invoice-form", "font", "--size", "40"]).is_err());

        let out = exec(&mut editor, &["style", "1", "col_rate", "italic", "true"]).unwrap();
        assert_eq!(out, r#"col_rate: {"italic":true}"#);
        exec(&mut editor, &["style", "1", "col_rate", "--clear"]).unwrap();
        assert!(editor
            .document()
            .field_style(0, FieldKey::Column(Column::Rate))
            .is_none());
        assert!(exec(&mut editor, &["style", "1", "col_rate", "size"]).is_err());
    }

    #[test]
    fn test_state_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().to_str().unwrap();

        let cli = Cli::try_parse_from(["invoice-form", "--state", state, "add-page"]).unwrap();
        assert_eq!(run(cli).unwrap(), "2 pages");

        let cli = Cli::try_parse_from(["invoice-form", "show", "--state", state, "--json"]).unwrap();
        let json = run(cli).unwrap();
        let pages: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(pages.len(), 2);
    }
}
