// ==========================================
// Excel 订单行导入 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xlsm/.xls/.ods) / CSV (.csv)
// 输入: 内存中的文件内容（宿主上传的 base64 载荷解码后）
// ==========================================

use crate::domain::line::ImportRequest;
use crate::domain::table::RawTable;
use crate::domain::types::{CellValue, RecordId};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::line_importer_trait::FileParser;
use base64::Engine;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::debug;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// ==========================================
// 载荷解码
// ==========================================

/// 解码 base64 载荷（容忍空白与 data URL 前缀）
pub fn decode_base64_payload(payload: &str) -> ImportResult<Vec<u8>> {
    let body = match payload.find(";base64,") {
        Some(pos) if payload.trim_start().starts_with("data:") => &payload[pos + 8..],
        _ => payload,
    };
    let compact: String = body.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(ImportError::MissingFile);
    }
    Ok(base64::engine::general_purpose::STANDARD.decode(compact)?)
}

impl ImportRequest {
    /// 从 base64 载荷构造导入请求
    pub fn from_base64(payload: &str, target_document_id: RecordId) -> ImportResult<Self> {
        let bytes = decode_base64_payload(payload)?;
        Ok(ImportRequest::new(bytes, target_document_id))
    }
}

/// 是否为工作簿格式（zip 容器或 OLE 复合文档）
pub fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC)
}

/// 工作表名匹配：先精确匹配，再 trim + 不区分大小写匹配
fn match_sheet_name(available: &[String], wanted: &str) -> Option<String> {
    if let Some(exact) = available.iter().find(|s| s.as_str() == wanted) {
        return Some(exact.clone());
    }
    let wanted = wanted.trim().to_lowercase();
    available
        .iter()
        .find(|s| s.trim().to_lowercase() == wanted)
        .cloned()
}

/// calamine 单元格 → CellValue
fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::from_text(s),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        // 公式错误单元格以标记文本呈现（#N/A、#REF! ...）
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_table(
        &self,
        bytes: &[u8],
        sheet_name: Option<&str>,
        _file_name: Option<&str>,
    ) -> ImportResult<RawTable> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let sheet_names = workbook.sheet_names();
        let target = match sheet_name {
            Some(wanted) => match_sheet_name(&sheet_names, wanted).ok_or_else(|| {
                ImportError::SheetNotFound {
                    sheet: wanted.to_string(),
                    available: sheet_names.clone(),
                }
            })?,
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| ImportError::FileReadError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook.worksheet_range(&target)?;

        // 表头为已用区域首行（已用区域可能不从 A1 开始）
        let header_row = range.start().map(|(row, _)| row + 1).unwrap_or(1);
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => Vec::new(),
        };

        let data_rows: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        debug!(
            sheet = %target,
            columns = headers.len(),
            rows = data_rows.len(),
            "工作表解析完成"
        );

        Ok(RawTable {
            sheet_name: Some(target),
            headers,
            rows: data_rows,
            header_row,
        })
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_table(
        &self,
        bytes: &[u8],
        _sheet_name: Option<&str>,
        _file_name: Option<&str>,
    ) -> ImportResult<RawTable> {
        let content = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(content);

        let mut records = reader.records();
        let headers: Vec<String> = match records.next() {
            Some(record) => record?.iter().map(|h| h.trim().to_string()).collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::new();
        for result in records {
            let record = result?;
            let mut row: Vec<CellValue> = record.iter().map(CellValue::from_text).collect();
            row.resize(headers.len().max(row.len()), CellValue::Empty);
            rows.push(row);
        }

        debug!(columns = headers.len(), rows = rows.len(), "CSV 解析完成");

        Ok(RawTable {
            sheet_name: None,
            headers,
            rows,
            header_row: 1,
        })
    }
}

// ==========================================
// Universal Parser（按内容/文件名选择解析器）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_table(
        &self,
        bytes: &[u8],
        sheet_name: Option<&str>,
        file_name: Option<&str>,
    ) -> ImportResult<RawTable> {
        if is_workbook(bytes) {
            return ExcelParser.parse_to_raw_table(bytes, sheet_name, file_name);
        }

        let named_csv = file_name
            .map(|n| n.trim().to_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if named_csv || std::str::from_utf8(bytes).is_ok() {
            return CsvParser.parse_to_raw_table(bytes, sheet_name, file_name);
        }

        Err(ImportError::FileReadError(format!(
            "文件格式不支持: {}（仅支持 .xlsx/.xls/.ods/.csv）",
            file_name.unwrap_or("unknown")
        )))
    }
}
