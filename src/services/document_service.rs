// src/services/document_service.rs

use std::{fmt::Display, path::PathBuf};

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use rust_xlsxwriter::{Format, Workbook};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Store, VoucherRepository},
    models::{
        report::ReportSummary,
        voucher::{ItemSource, Voucher},
    },
};

const COMPANY_NAME: &str = "PLS OBRAS";

fn doc_err(e: impl Display) -> AppError {
    AppError::DocumentError(e.to_string())
}

fn brl(value: Decimal) -> String {
    format!("R$ {:.2}", value)
}

fn money(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

#[derive(Clone)]
pub struct DocumentService {
    store: Store,
    voucher_repo: VoucherRepository,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(store: Store, voucher_repo: VoucherRepository, fonts_dir: PathBuf) -> Self {
        Self {
            store,
            voucher_repo,
            fonts_dir,
        }
    }

    fn new_document(&self, title: String) -> Result<genpdf::Document, AppError> {
        // Carrega a fonte Roboto da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None).map_err(|_| {
            AppError::FontNotFound(format!(
                "Fonte Roboto não encontrada em {}",
                self.fonts_dir.display()
            ))
        })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(title);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(COMPANY_NAME).styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1));
        Ok(doc)
    }

    fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(doc_err)?;
        Ok(buffer)
    }

    // ---
    // Impressão do talão
    // ---

    pub async fn voucher_pdf(&self, voucher_id: Uuid) -> Result<(String, Vec<u8>), AppError> {
        let voucher = self.voucher_repo.find(voucher_id).await?;

        // Nomes de obra e produtos, lidos antes de montar o PDF
        let (project_name, product_names) = {
            let state = self.store.read().await;
            let project_name = state
                .projects
                .get(voucher.project_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| "(obra removida)".to_string());
            let product_names: Vec<String> = voucher
                .items
                .iter()
                .map(|i| item_label(i.description.as_deref(), i.product_id.and_then(|id| state.products.get(id)).map(|p| p.name.as_str())))
                .collect();
            (project_name, product_names)
        };

        let doc = self.voucher_document(&voucher, &project_name, &product_names)?;
        Ok((voucher.number.clone(), Self::render(doc)?))
    }

    fn voucher_document(
        &self,
        voucher: &Voucher,
        project_name: &str,
        product_names: &[String],
    ) -> Result<genpdf::Document, AppError> {
        let mut doc = self.new_document(format!("Talão {}", voucher.number))?;

        doc.push(
            elements::Paragraph::new(format!("TALÃO {}", voucher.number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!("Obra: {}", project_name)));
        doc.push(elements::Paragraph::new(format!("Solicitante: {}", voucher.requester)));
        doc.push(elements::Paragraph::new(format!(
            "Data: {}",
            voucher.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Paragraph::new(format!("Status: {}", voucher.status)));
        doc.push(elements::Break::new(1.5));

        // Pesos: Item (4), Origem (2), Pedida (1), Entregue (1), Devolvida (1)
        let mut table = elements::TableLayout::new(vec![4, 2, 1, 1, 1]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Item").styled(bold))
            .element(elements::Paragraph::new("Origem").styled(bold))
            .element(elements::Paragraph::new("Pedida").styled(bold))
            .element(elements::Paragraph::new("Entregue").styled(bold))
            .element(elements::Paragraph::new("Devolvida").styled(bold))
            .push()
            .map_err(doc_err)?;

        for (item, name) in voucher.items.iter().zip(product_names) {
            let source = match item.source {
                ItemSource::Stock => "Estoque",
                ItemSource::ExternalPurchase => "Compra externa",
            };
            table
                .row()
                .element(elements::Paragraph::new(name.as_str()))
                .element(elements::Paragraph::new(source))
                .element(elements::Paragraph::new(format!("{} {}", item.quantity, item.unit)))
                .element(elements::Paragraph::new(item.delivered_quantity.to_string()))
                .element(elements::Paragraph::new(item.returned_quantity.to_string()))
                .push()
                .map_err(doc_err)?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        match &voucher.signature {
            Some(signature) => {
                doc.push(elements::Paragraph::new(format!("Recebido por: {}", signature.receiver_name)));
                if let Some(tax_id) = &signature.tax_id {
                    doc.push(elements::Paragraph::new(format!("CPF: {}", tax_id)));
                }
                doc.push(elements::Paragraph::new(format!(
                    "Em: {}",
                    signature.signed_at.format("%d/%m/%Y %H:%M")
                )));
            }
            None => {
                doc.push(elements::Paragraph::new("Recebido por: ______________________________"));
            }
        }
        doc.push(elements::Break::new(1.5));

        // QR Code com o número do talão, para conferência na entrega
        let code = QrCode::new(voucher.number.as_bytes()).map_err(doc_err)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(doc_err)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        Ok(doc)
    }

    // ---
    // Relatório (PDF)
    // ---

    pub fn report_pdf(&self, report: &ReportSummary) -> Result<Vec<u8>, AppError> {
        let mut doc = self.new_document("Relatório de materiais por obra".to_string())?;

        doc.push(
            elements::Paragraph::new("RELATÓRIO DE MATERIAIS POR OBRA")
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(period_label(report)));
        doc.push(elements::Paragraph::new(format!(
            "Gerado em: {}",
            report.generated_at.format("%d/%m/%Y %H:%M")
        )));
        doc.push(elements::Break::new(1.5));

        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Obra").styled(bold))
            .element(elements::Paragraph::new("Talões").styled(bold))
            .element(elements::Paragraph::new("Estoque").styled(bold))
            .element(elements::Paragraph::new("Compras ext.").styled(bold))
            .element(elements::Paragraph::new("Total").styled(bold))
            .element(elements::Paragraph::new("Devolvido").styled(bold))
            .push()
            .map_err(doc_err)?;

        for line in &report.per_project {
            table
                .row()
                .element(elements::Paragraph::new(line.project_name.as_str()))
                .element(elements::Paragraph::new(line.totals.voucher_count.to_string()))
                .element(elements::Paragraph::new(brl(line.totals.stock_value)))
                .element(elements::Paragraph::new(brl(line.totals.external_value)))
                .element(elements::Paragraph::new(brl(line.totals.total_value)))
                .element(elements::Paragraph::new(brl(line.totals.returned_value)))
                .push()
                .map_err(doc_err)?;
        }

        table
            .row()
            .element(elements::Paragraph::new("TOTAL").styled(bold))
            .element(elements::Paragraph::new(report.totals.voucher_count.to_string()).styled(bold))
            .element(elements::Paragraph::new(brl(report.totals.stock_value)).styled(bold))
            .element(elements::Paragraph::new(brl(report.totals.external_value)).styled(bold))
            .element(elements::Paragraph::new(brl(report.totals.total_value)).styled(bold))
            .element(elements::Paragraph::new(brl(report.totals.returned_value)).styled(bold))
            .push()
            .map_err(doc_err)?;

        doc.push(table);
        doc.push(elements::Break::new(2));

        doc.push(
            elements::Paragraph::new(format!(
                "LÍQUIDO: {}",
                brl(report.totals.total_value - report.totals.returned_value)
            ))
            .aligned(genpdf::Alignment::Right)
            .styled(style::Style::new().bold().with_font_size(12)),
        );

        Self::render(doc)
    }

    // ---
    // Relatório (planilha)
    // ---

    pub fn report_xlsx(&self, report: &ReportSummary) -> Result<Vec<u8>, AppError> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Resumo por Obra")?;
            let columns = [
                "Obra",
                "Cidade",
                "Qtd Talões",
                "Total Estoque",
                "Total Compras Externas",
                "Total Geral",
                "Total Devolvido",
                "Líquido",
            ];
            for (col, title) in columns.iter().enumerate() {
                sheet.write_string_with_format(0, col as u16, *title, &header)?;
            }
            for (i, line) in report.per_project.iter().enumerate() {
                let row = i as u32 + 1;
                let t = &line.totals;
                sheet.write_string(row, 0, line.project_name.as_str())?;
                sheet.write_string(row, 1, line.city.as_deref().unwrap_or(""))?;
                sheet.write_number(row, 2, t.voucher_count as f64)?;
                sheet.write_number(row, 3, money(t.stock_value))?;
                sheet.write_number(row, 4, money(t.external_value))?;
                sheet.write_number(row, 5, money(t.total_value))?;
                sheet.write_number(row, 6, money(t.returned_value))?;
                sheet.write_number(row, 7, money(t.total_value - t.returned_value))?;
            }
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Talões")?;
            for (col, title) in ["Número", "Obra", "Solicitante", "Status", "Data", "Valor Total"]
                .iter()
                .enumerate()
            {
                sheet.write_string_with_format(0, col as u16, *title, &header)?;
            }
            for (i, line) in report.vouchers.iter().enumerate() {
                let row = i as u32 + 1;
                sheet.write_string(row, 0, line.number.as_str())?;
                sheet.write_string(row, 1, line.project_name.as_deref().unwrap_or(""))?;
                sheet.write_string(row, 2, line.requester.as_str())?;
                sheet.write_string(row, 3, line.status.label())?;
                sheet.write_string(row, 4, line.created_at.format("%d/%m/%Y").to_string())?;
                sheet.write_number(row, 5, money(line.total_value))?;
            }
        }

        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Devoluções")?;
            for (col, title) in ["Data", "Talão", "Obra", "Item", "Quantidade", "Motivo", "Valor"]
                .iter()
                .enumerate()
            {
                sheet.write_string_with_format(0, col as u16, *title, &header)?;
            }
            for (i, line) in report.returns.iter().enumerate() {
                let row = i as u32 + 1;
                sheet.write_string(row, 0, line.created_at.format("%d/%m/%Y").to_string())?;
                sheet.write_string(row, 1, line.voucher_number.as_deref().unwrap_or(""))?;
                sheet.write_string(row, 2, line.project_name.as_deref().unwrap_or(""))?;
                sheet.write_string(row, 3, line.item_description.as_deref().unwrap_or(""))?;
                sheet.write_number(row, 4, money(line.quantity))?;
                sheet.write_string(row, 5, line.reason.as_deref().unwrap_or(""))?;
                sheet.write_number(row, 6, money(line.value))?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn item_label(description: Option<&str>, product_name: Option<&str>) -> String {
    match (product_name, description) {
        (Some(name), _) => name.to_string(),
        (None, Some(description)) => description.to_string(),
        (None, None) => "-".to_string(),
    }
}

fn period_label(report: &ReportSummary) -> String {
    let fmt = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "...".to_string())
    };
    format!("Período: {} a {}", fmt(report.filter.from), fmt(report.filter.to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryStorage, Snapshot},
        models::report::ReportFilter,
        services::report_service::build_summary,
    };
    use std::sync::Arc;

    async fn service(fonts_dir: &str) -> DocumentService {
        let store = Store::open(Arc::new(MemoryStorage::default()), Snapshot::default())
            .await
            .unwrap();
        DocumentService::new(store.clone(), VoucherRepository::new(store), PathBuf::from(fonts_dir))
    }

    #[tokio::test]
    async fn xlsx_report_is_a_zip_archive() {
        let report = build_summary(&Snapshot::default(), ReportFilter::default());
        let bytes = service("./fonts").await.report_xlsx(&report).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn missing_font_is_reported() {
        let report = build_summary(&Snapshot::default(), ReportFilter::default());
        let result = service("/caminho/inexistente").await.report_pdf(&report);
        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }

    #[test]
    fn item_label_prefers_catalog_name() {
        assert_eq!(item_label(Some("avulso"), Some("Cimento CP-II")), "Cimento CP-II");
        assert_eq!(item_label(Some("avulso"), None), "avulso");
        assert_eq!(item_label(None, None), "-");
    }
}
