use crate::types::{Result, StickerError, StickerRecord};
use std::io::Read;
use std::path::Path;

/// Template offered for download: header plus two example rows.
pub const CSV_TEMPLATE: &str = "name,phone,email,website,qr_data
Example Business,+1 555 010 0200,info@example.com,https://example.com,https://example.com
Corner Bakery,+1 555 010 0300,hello@bakery.example,https://bakery.example,https://bakery.example/menu
";

const NAME_COLUMNS: &[&str] = &["name", "business_name"];
const PHONE_COLUMNS: &[&str] = &["phone", "telephone"];
const EMAIL_COLUMNS: &[&str] = &["email"];
const WEBSITE_COLUMNS: &[&str] = &["website", "url"];
const QR_COLUMNS: &[&str] = &["qr_data"];

/// Column indices resolved from the header row. The first matching synonym wins.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    phone: Option<usize>,
    email: Option<usize>,
    website: Option<usize>,
    qr_data: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let find = |synonyms: &[&str]| {
            synonyms.iter().find_map(|wanted| {
                headers
                    .iter()
                    .position(|header| header.trim().eq_ignore_ascii_case(wanted))
            })
        };

        Self {
            name: find(NAME_COLUMNS),
            phone: find(PHONE_COLUMNS),
            email: find(EMAIL_COLUMNS),
            website: find(WEBSITE_COLUMNS),
            qr_data: find(QR_COLUMNS),
        }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.website.is_none()
            && self.qr_data.is_none()
    }
}

fn field(row: &csv::StringRecord, column: Option<usize>) -> String {
    column
        .and_then(|index| row.get(index))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

/// Parse CSV with a header row into sticker records.
///
/// Unknown columns are ignored and blank rows are skipped. Ids are assigned
/// sequentially from 1. An empty `qr_data` cell falls back to the website, then
/// the phone number.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<StickerRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = ColumnMap::from_headers(reader.headers()?);
    if columns.is_empty() {
        return Err(StickerError::MissingHeader);
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        if row.iter().all(|value| value.trim().is_empty()) {
            continue;
        }

        let website = field(&row, columns.website);
        let phone = field(&row, columns.phone);
        let qr_data = [field(&row, columns.qr_data), website.clone(), phone.clone()]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default();

        records.push(StickerRecord {
            id: (records.len() + 1).to_string(),
            name: field(&row, columns.name),
            phone,
            email: field(&row, columns.email),
            website: (!website.is_empty()).then_some(website),
            qr_data,
            ..Default::default()
        });
    }

    log::debug!("Parsed {} records from CSV", records.len());
    Ok(records)
}

pub async fn load_from_csv(path: impl AsRef<Path>) -> Result<Vec<StickerRecord>> {
    let path = path.as_ref().to_owned();

    let contents = tokio::fs::read(&path).await?;

    // CSV parsing is CPU-bound, spawn blocking
    let records = tokio::task::spawn_blocking(move || parse_csv(contents.as_slice())).await??;

    log::info!("Imported {} stickers from {}", records.len(), path.display());
    Ok(records)
}

pub async fn write_template(path: impl AsRef<Path>) -> Result<()> {
    tokio::fs::write(path.as_ref(), CSV_TEMPLATE).await?;
    Ok(())
}
