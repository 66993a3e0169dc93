// src/spreadsheets/leads_xlsx.rs
use crate::domain::Lead;
use crate::errors::ServerError;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

const HEADERS: [&str; 11] = [
    "Name",
    "Email",
    "Phone",
    "Requirements",
    "Status",
    "Submitted",
    "Score",
    "Quality",
    "Priority",
    "Next Action",
    "Tags",
];

fn xlsx_err(what: &str) -> impl Fn(rust_xlsxwriter::XlsxError) -> ServerError + '_ {
    move |e| ServerError::XlsxError(format!("Failed to write {what}: {e}"))
}

fn write_text(ws: &mut Worksheet, row: u32, col: u16, value: &str, what: &str) -> Result<(), ServerError> {
    ws.write_string(row, col, value).map_err(xlsx_err(what))?;
    Ok(())
}

/// Workbook bytes with one row per lead, in the order given.
pub fn leads_xlsx(leads: &[Lead]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(xlsx_err(header))?;
    }

    for (i, lead) in leads.iter().enumerate() {
        let r = (i + 1) as u32;

        write_text(worksheet, r, 0, &lead.full_name(), "name")?;
        write_text(worksheet, r, 1, &lead.email, "email")?;
        write_text(worksheet, r, 2, &lead.phone, "phone")?;
        write_text(worksheet, r, 3, &lead.property_description, "requirements")?;
        write_text(worksheet, r, 4, lead.status.as_str(), "status")?;
        write_text(
            worksheet,
            r,
            5,
            &lead.submitted_at.format("%Y-%m-%d %H:%M").to_string(),
            "submitted",
        )?;

        match &lead.score {
            Some(score) => {
                worksheet
                    .write_number(r, 6, f64::from(score.total))
                    .map_err(xlsx_err("score"))?;
                write_text(worksheet, r, 7, score.quality.as_str(), "quality")?;
                write_text(worksheet, r, 8, score.priority.as_str(), "priority")?;
                write_text(worksheet, r, 9, &score.next_action, "next action")?;
            }
            None => write_text(worksheet, r, 7, "unscored", "quality")?,
        }

        write_text(worksheet, r, 10, &lead.tags.join(", "), "tags")?;
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LeadScorer, NewLead};
    use chrono::Utc;

    #[test]
    fn workbook_is_a_zip_container() {
        let now = Utc::now();
        let mut lead = NewLead {
            first_name: "Gurpreet".into(),
            last_name: "Sandhu".into(),
            email: "g@example.com".into(),
            phone: "98765".into(),
            property_description: "villa in Chandigarh".into(),
        }
        .into_lead(now);
        LeadScorer::default().refresh(&mut lead, now);

        let bytes = leads_xlsx(&[lead]).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_workbook_still_has_headers() {
        assert!(leads_xlsx(&[]).is_ok());
    }
}
