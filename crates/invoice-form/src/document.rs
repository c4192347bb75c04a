//! Invoice pages and their edits
//!
//! Every edit is a pure transform: it returns a new [`Document`] and leaves
//! the receiver untouched. Out-of-range page or row indices yield an
//! unchanged copy.

use crate::keys::{Column, FieldKey, HeaderField, PageField};
use crate::style::{FieldStyleOverride, StyleProperty};
use rupee_text::{amount_to_words, parse_amount_or_zero, split_currency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Most rows a page's line-item table holds
pub const MAX_ROWS: usize = 20;

/// One row of the line-item table; every cell is display text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub sno: String,
    pub particulars: String,
    pub qty: String,
    pub rate: String,
    pub amount_rs: String,
    pub amount_p: String,
}

impl LineItem {
    /// Blank row numbered for position `index`
    pub fn empty(index: usize) -> Self {
        Self {
            sno: (index + 1).to_string(),
            ..Self::default()
        }
    }

    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Sno => &self.sno,
            Column::Particulars => &self.particulars,
            Column::Qty => &self.qty,
            Column::Rate => &self.rate,
            Column::AmountRs => &self.amount_rs,
            Column::AmountP => &self.amount_p,
        }
    }

    fn cell_mut(&mut self, column: Column) -> &mut String {
        match column {
            Column::Sno => &mut self.sno,
            Column::Particulars => &mut self.particulars,
            Column::Qty => &mut self.qty,
            Column::Rate => &mut self.rate,
            Column::AmountRs => &mut self.amount_rs,
            Column::AmountP => &mut self.amount_p,
        }
    }

    /// Row amount in fractional rupees, from the amount cells
    pub fn amount(&self) -> f64 {
        parse_amount_or_zero(&self.amount_rs) + parse_amount_or_zero(&self.amount_p) / 100.0
    }

    /// Refill the amount cells from qty x rate
    fn recompute_amount(&mut self) {
        let amount = parse_amount_or_zero(&self.qty) * parse_amount_or_zero(&self.rate);
        let split = split_currency(amount);
        self.amount_rs = split.rupees_display();
        self.amount_p = split.paise_display();
    }
}

/// One printed invoice sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub bill_no: String,
    pub date: String,
    pub challan_no: String,
    pub dispatch_through: String,
    pub po_no: String,
    pub ms: String,
    pub address1: String,
    pub address2: String,
    pub line_items: Vec<LineItem>,
    pub total_rs: String,
    pub total_p: String,
    pub amount_words: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub field_styles: BTreeMap<FieldKey, FieldStyleOverride>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            bill_no: String::new(),
            date: String::new(),
            challan_no: String::new(),
            dispatch_through: String::new(),
            po_no: String::new(),
            ms: String::new(),
            address1: String::new(),
            address2: String::new(),
            line_items: vec![LineItem::empty(0)],
            total_rs: String::new(),
            total_p: String::new(),
            amount_words: String::new(),
            field_styles: BTreeMap::new(),
        }
    }
}

impl Page {
    /// Pages after the first carry a "(Continued)" marker on screen
    pub fn is_continued(index: usize) -> bool {
        index > 0
    }

    pub fn header(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::BillNo => &self.bill_no,
            HeaderField::Date => &self.date,
            HeaderField::ChallanNo => &self.challan_no,
            HeaderField::DispatchThrough => &self.dispatch_through,
            HeaderField::PoNo => &self.po_no,
            HeaderField::Ms => &self.ms,
            HeaderField::Address1 => &self.address1,
            HeaderField::Address2 => &self.address2,
        }
    }

    pub fn value(&self, field: PageField) -> &str {
        match field {
            PageField::Header(h) => self.header(h),
            PageField::TotalRs => &self.total_rs,
            PageField::TotalP => &self.total_p,
            PageField::AmountWords => &self.amount_words,
        }
    }

    fn value_mut(&mut self, field: PageField) -> &mut String {
        match field {
            PageField::Header(h) => match h {
                HeaderField::BillNo => &mut self.bill_no,
                HeaderField::Date => &mut self.date,
                HeaderField::ChallanNo => &mut self.challan_no,
                HeaderField::DispatchThrough => &mut self.dispatch_through,
                HeaderField::PoNo => &mut self.po_no,
                HeaderField::Ms => &mut self.ms,
                HeaderField::Address1 => &mut self.address1,
                HeaderField::Address2 => &mut self.address2,
            },
            PageField::TotalRs => &mut self.total_rs,
            PageField::TotalP => &mut self.total_p,
            PageField::AmountWords => &mut self.amount_words,
        }
    }

    /// Sum of row amounts, split back into the total cells
    fn recompute_totals(&mut self) {
        let total: f64 = self.line_items.iter().map(LineItem::amount).sum();
        let split = split_currency(total);
        self.total_rs = split.rupees_display();
        self.total_p = split.paise_display();
        self.recompute_words();
    }

    fn recompute_words(&mut self) {
        self.amount_words = amount_to_words(&self.total_rs, &self.total_p);
    }

    fn renumber(&mut self) {
        for (index, item) in self.line_items.iter_mut().enumerate() {
            item.sno = (index + 1).to_string();
        }
    }

    /// Bring a loaded page back within the row bounds
    fn normalize(&mut self) {
        if self.line_items.is_empty() {
            self.line_items.push(LineItem::empty(0));
        }
        self.line_items.truncate(MAX_ROWS);
    }
}

/// All pages of the invoice being edited
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pages: Vec<Page>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }
}

impl Document {
    /// Single empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap loaded pages, restoring the one-page and one-row floors
    pub fn from_pages(pages: Vec<Page>) -> Self {
        let mut document = Self { pages };
        document.normalize();
        document
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let pages: Vec<Page> = serde_json::from_str(json)?;
        Ok(Self::from_pages(pages))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Bill number of the first page, used to name exports
    pub fn bill_no(&self) -> Option<&str> {
        self.pages
            .first()
            .map(|p| p.bill_no.trim())
            .filter(|b| !b.is_empty())
    }

    /// A fresh single empty page
    pub fn cleared(&self) -> Document {
        Document::default()
    }

    /// Append an empty page
    pub fn add_page(&self) -> Document {
        let mut next = self.clone();
        next.pages.push(Page::default());
        next
    }

    /// Drop a page
    ///
    /// Keeping at least one page is the caller's job.
    pub fn remove_page(&self, page: usize) -> Document {
        let mut next = self.clone();
        if page < next.pages.len() {
            next.pages.remove(page);
        } else {
            debug!(page, "remove_page out of range");
        }
        next
    }

    /// Set a header value; editing a total refreshes the amount in words
    pub fn update_header_field(&self, page: usize, field: PageField, value: &str) -> Document {
        self.with_page(page, |p| {
            *p.value_mut(field) = value.to_string();
            if field.is_total() {
                p.recompute_words();
            }
        })
    }

    /// Append an empty row unless the table is full
    pub fn add_row(&self, page: usize) -> Document {
        self.with_page(page, |p| {
            if p.line_items.len() >= MAX_ROWS {
                debug!(page, "row limit reached");
                return;
            }
            let index = p.line_items.len();
            p.line_items.push(LineItem::empty(index));
        })
    }

    /// Remove a row and renumber; an emptied table gets one blank row back
    pub fn remove_row(&self, page: usize, row: usize) -> Document {
        self.with_page(page, |p| {
            if row >= p.line_items.len() {
                debug!(page, row, "remove_row out of range");
                return;
            }
            p.line_items.remove(row);
            if p.line_items.is_empty() {
                p.line_items.push(LineItem::empty(0));
            }
            p.renumber();
        })
    }

    /// Set one cell
    ///
    /// `qty` and `rate` edits refill the row amount, the page totals and the
    /// amount in words. Other cells, including the amount cells, change alone.
    pub fn update_line_item(&self, page: usize, row: usize, column: Column, value: &str) -> Document {
        self.with_page(page, |p| {
            let Some(item) = p.line_items.get_mut(row) else {
                debug!(page, row, "update_line_item out of range");
                return;
            };
            *item.cell_mut(column) = value.to_string();

            if column.drives_amount() {
                item.recompute_amount();
                p.recompute_totals();
            }
        })
    }

    /// Override one font property of a field on a page
    pub fn set_field_style(&self, page: usize, key: FieldKey, property: StyleProperty) -> Document {
        self.with_page(page, |p| {
            let style = p.field_styles.get(&key).cloned().unwrap_or_default();
            p.field_styles.insert(key, style.with(property));
        })
    }

    /// Drop every override of a field on a page
    pub fn clear_field_style(&self, page: usize, key: FieldKey) -> Document {
        self.with_page(page, |p| {
            p.field_styles.remove(&key);
        })
    }

    pub fn field_style(&self, page: usize, key: FieldKey) -> Option<&FieldStyleOverride> {
        self.pages.get(page).and_then(|p| p.field_styles.get(&key))
    }

    fn with_page(&self, page: usize, edit: impl FnOnce(&mut Page)) -> Document {
        let mut next = self.clone();
        match next.pages.get_mut(page) {
            Some(p) => edit(p),
            None => debug!(page, "page out of range"),
        }
        next
    }

    fn normalize(&mut self) {
        if self.pages.is_empty() {
            self.pages.push(Page::default());
        }
        for page in &mut self.pages {
            page.normalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snos(doc: &Document, page: usize) -> Vec<String> {
        doc.pages()[page]
            .line_items
            .iter()
            .map(|i| i.sno.clone())
            .collect()
    }

    fn with_rows(n: usize) -> Document {
        (1..n).fold(Document::new(), |doc, _| doc.add_row(0))
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages()[0].line_items, vec![LineItem::empty(0)]);
        assert_eq!(doc.pages()[0].line_items[0].sno, "1");
    }

    #[test]
    fn test_add_row_stops_at_limit() {
        let doc = with_rows(MAX_ROWS);
        assert_eq!(doc.pages()[0].line_items.len(), MAX_ROWS);

        let doc = doc.add_row(0);
        assert_eq!(doc.pages()[0].line_items.len(), MAX_ROWS);
        assert_eq!(snos(&doc, 0).last().unwrap(), "20");
    }

    #[test]
    fn test_remove_row_renumbers() {
        let doc = with_rows(5)
            .update_line_item(0, 2, Column::Particulars, "third")
            .remove_row(0, 1);

        assert_eq!(snos(&doc, 0), vec!["1", "2", "3", "4"]);
        assert_eq!(doc.pages()[0].line_items[1].particulars, "third");

        let doc = doc.remove_row(0, 0).remove_row(0, 0).remove_row(0, 0);
        assert_eq!(snos(&doc, 0), vec!["1"]);
    }

    #[test]
    fn test_remove_last_row_restores_blank_row() {
        let doc = Document::new()
            .update_line_item(0, 0, Column::Particulars, "Bolts")
            .remove_row(0, 0);
        assert_eq!(doc.pages()[0].line_items, vec![LineItem::empty(0)]);
    }

    #[test]
    fn test_remove_row_out_of_range() {
        let doc = with_rows(2);
        assert_eq!(doc.remove_row(0, 5), doc);
        assert_eq!(doc.remove_row(3, 0), doc);
    }

    #[test]
    fn test_qty_rate_recompute() {
        let doc = with_rows(2)
            .update_line_item(0, 0, Column::Qty, "3")
            .update_line_item(0, 0, Column::Rate, "12.25")
            .update_line_item(0, 1, Column::Qty, "2")
            .update_line_item(0, 1, Column::Rate, "100");

        let page = &doc.pages()[0];
        assert_eq!(page.line_items[0].amount_rs, "36");
        assert_eq!(page.line_items[0].amount_p, "75");
        assert_eq!(page.line_items[1].amount_rs, "200");
        assert_eq!(page.line_items[1].amount_p, "");
        assert_eq!(page.total_rs, "236");
        assert_eq!(page.total_p, "75");
        assert_eq!(
            page.amount_words,
            "Rupees Two Hundred Thirty Six and Seventy Five Paise Only"
        );
    }

    #[test]
    fn test_qty_without_rate_blanks_amount() {
        let doc = Document::new().update_line_item(0, 0, Column::Qty, "4");
        let page = &doc.pages()[0];
        assert_eq!(page.line_items[0].amount_rs, "");
        assert_eq!(page.total_rs, "");
        assert_eq!(page.amount_words, "");
    }

    #[test]
    fn test_amount_edit_does_not_recompute() {
        let doc = Document::new()
            .update_line_item(0, 0, Column::Qty, "2")
            .update_line_item(0, 0, Column::Rate, "50");
        let before = doc.pages()[0].clone();

        let doc = doc.update_line_item(0, 0, Column::AmountRs, "999");
        let page = &doc.pages()[0];
        assert_eq!(page.line_items[0].amount_rs, "999");
        assert_eq!(page.total_rs, before.total_rs);
        assert_eq!(page.amount_words, before.amount_words);
    }

    #[test]
    fn test_total_edit_refreshes_words() {
        let doc = Document::new()
            .update_header_field(0, PageField::TotalRs, "100")
            .update_header_field(0, PageField::TotalP, "50");
        assert_eq!(
            doc.pages()[0].amount_words,
            "Rupees One Hundred and Fifty Paise Only"
        );

        let doc = doc.update_header_field(0, PageField::AmountWords, "Rupees Hundred Only");
        assert_eq!(doc.pages()[0].amount_words, "Rupees Hundred Only");
        assert_eq!(doc.pages()[0].total_rs, "100");
    }

    #[test]
    fn test_header_edit() {
        let doc = Document::new().update_header_field(
            0,
            PageField::Header(HeaderField::BillNo),
            "A-17",
        );
        assert_eq!(doc.pages()[0].bill_no, "A-17");
        assert_eq!(doc.bill_no(), Some("A-17"));
        assert_eq!(Document::new().bill_no(), None);
    }

    #[test]
    fn test_edits_leave_input_untouched() {
        let doc = Document::new();
        let _ = doc.update_line_item(0, 0, Column::Qty, "5").add_page();
        assert_eq!(doc, Document::new());
    }

    #[test]
    fn test_pages() {
        let doc = Document::new().add_page().add_page();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.remove_page(1).page_count(), 2);
        assert_eq!(doc.remove_page(7).page_count(), 3);
        assert_eq!(doc.cleared(), Document::new());
        assert!(!Page::is_continued(0));
        assert!(Page::is_continued(2));
    }

    #[test]
    fn test_field_styles() {
        let key = FieldKey::Column(Column::Particulars);
        let doc = Document::new()
            .set_field_style(0, key, StyleProperty::Size(9.0))
            .set_field_style(0, key, StyleProperty::Bold(true));

        let style = doc.field_style(0, key).unwrap();
        assert_eq!(style.size, Some(9.0));
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.family, None);

        let doc = doc.clear_field_style(0, key);
        assert!(doc.field_style(0, key).is_none());
    }

    #[test]
    fn test_json_shape() {
        let doc = Document::new()
            .update_header_field(0, PageField::Header(HeaderField::PoNo), "77")
            .set_field_style(0, FieldKey::TotalRs, StyleProperty::Italic(true));
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert!(value.is_array());
        assert_eq!(value[0]["poNo"], "77");
        assert_eq!(value[0]["lineItems"][0]["amountRs"], "");
        assert_eq!(value[0]["fieldStyles"]["totalRs"]["italic"], true);
    }

    #[test]
    fn test_loads_older_drafts() {
        let doc = Document::from_json(
            r#"[{"billNo": "9", "lineItems": [], "totalRs": "", "totalP": ""}]"#,
        )
        .unwrap();
        let page = &doc.pages()[0];
        assert_eq!(page.bill_no, "9");
        assert_eq!(page.amount_words, "");
        assert_eq!(page.line_items.len(), 1);

        assert_eq!(Document::from_json("[]").unwrap(), Document::new());
        assert!(Document::from_json("{}").is_err());
    }
}
