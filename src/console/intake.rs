//! 数据采集与确认界面
//!
//! 只负责提示、重试和展示；所有校验都交给 `RecordParser`。

use std::io::{self, BufRead, Write};

use chrono::FixedOffset;

use crate::models::assignment::BindingPreview;
use crate::models::broadcast::{BroadcastRecordBatch, Field, FieldSet};
use crate::services::record_parser::{BatchParse, PastSchedule, RecordParser};

use super::Prompter;

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// 逐项输入
    Individual,
    /// 粘贴批量文本
    Batch,
}

fn eof() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "entrada encerrada")
}

/// 选择输入模式，无效选项时重新询问
pub fn choose_mode<R: BufRead, W: Write>(p: &mut Prompter<R, W>) -> io::Result<InputMode> {
    p.say("=== ENTRADA DE DADOS DAS TRANSMISSÕES ===")?;
    p.say("Escolha o modo de entrada:")?;
    p.say("1. Entrada individual (interativa)")?;
    p.say("2. Entrada em lote (colar texto com múltiplas transmissões)")?;

    loop {
        match p.ask("\nEscolha uma opção (1 ou 2): ")?.ok_or_else(eof)?.as_str() {
            "1" => return Ok(InputMode::Individual),
            "2" => return Ok(InputMode::Batch),
            _ => p.say("Opção inválida.")?,
        }
    }
}

/// 所有转播共用的描述文字（可为空）
pub fn ask_description<R: BufRead, W: Write>(p: &mut Prompter<R, W>) -> io::Result<String> {
    p.say("\n=== TEXTO PERSONALIZADO PARA DESCRIÇÃO ===")?;
    p.say("Informe um texto que será usado na descrição de todas as transmissões (opcional).")?;
    Ok(p.ask("Pressione Enter para pular ou digite o texto: ")?.unwrap_or_default())
}

/// 逐项采集
///
/// 每个字段单独校验并重试；已有记录时标题留空即结束。
/// 输入结束时丢弃未完成的记录，返回已采集的部分。
pub fn collect_individual<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    parser: &RecordParser,
) -> io::Result<BroadcastRecordBatch> {
    let mut records = BroadcastRecordBatch::new();
    p.say("\nInsira os dados das transmissões (deixe o título vazio para finalizar):")?;

    'records: loop {
        let number = records.len() + 1;
        p.say(format!("\nTransmissão #{}", number))?;

        let mut fields = FieldSet::default();
        for field in Field::ALL {
            loop {
                let Some(value) = p.ask(&field_prompt(field))? else {
                    break 'records;
                };

                if field == Field::Title && value.is_empty() {
                    if records.is_empty() {
                        p.say("Pelo menos uma transmissão deve ser informada.")?;
                        continue;
                    }
                    break 'records;
                }

                match parser.check_field(field, &value) {
                    Ok(()) => {
                        fields.set(field, value);
                        break;
                    }
                    Err(kind) => p.say(format!("{}: {}. Tente novamente.", field, kind))?,
                }
            }
        }

        match parser.validate_fields(number, &fields) {
            Ok(record) => {
                records.push(record);
                p.say("Transmissão adicionada.")?;
            }
            Err(e) => p.say(format!("Transmissão descartada: {}", e))?,
        }
    }

    Ok(records)
}

fn field_prompt(field: Field) -> String {
    match field {
        Field::Date => format!("{} (DD/MM/AAAA): ", field),
        Field::Time => format!("{} (HH:MM): ", field),
        _ => format!("{}: ", field),
    }
}

/// 批量采集：读到输入结束，逐块解析并显示被忽略的区块
pub fn collect_batch<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    parser: &RecordParser,
) -> io::Result<BatchParse> {
    p.say("\nCole o texto com os dados das transmissões no seguinte formato:")?;
    p.say("Título: [título da transmissão]")?;
    p.say("Pregador: [nome do pregador]")?;
    p.say("Data: [data no formato DD/MM/AAAA]")?;
    p.say("Horário: [horário no formato HH:MM]")?;
    p.say("\nSepare cada transmissão com uma linha em branco.")?;
    p.say("Para finalizar pressione Ctrl+D (Unix/Mac) ou Ctrl+Z seguido de Enter (Windows).")?;
    p.say("\n--- Cole seu texto abaixo ---")?;

    let text = p.read_until_eof()?;
    let parse = parser.parse_batch(&text);

    for error in &parse.errors {
        p.say(format!("Aviso: transmissão ignorada ({})", error))?;
    }
    Ok(parse)
}

/// 采集结果摘要
pub fn show_records<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    batch: &BroadcastRecordBatch,
) -> io::Result<()> {
    if batch.is_empty() {
        return p.say("\nNenhuma transmissão foi coletada.");
    }
    p.say(format!("\nForam coletadas {} transmissões:", batch.len()))?;
    for (idx, r) in batch.iter().enumerate() {
        p.say(format!(
            "{}. {} - {} - {} {}",
            idx + 1,
            r.title,
            r.presenter,
            r.date_text(),
            r.time_text()
        ))?;
    }
    Ok(())
}

/// 已过去的开始时间（仅提示）
pub fn show_past_schedules<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    past: &[PastSchedule],
    offset: FixedOffset,
) -> io::Result<()> {
    for item in past {
        p.say(format!(
            "Atenção: a transmissão #{} \"{}\" está marcada para {}, que já passou.",
            item.index,
            item.title,
            item.start.with_timezone(&offset).format("%d/%m/%Y %H:%M")
        ))?;
    }
    Ok(())
}

/// 显示封面配对预览并请求确认
pub fn confirm_preview<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    preview: &BindingPreview,
) -> io::Result<bool> {
    p.say("\nAssociação de capas às transmissões:")?;
    for a in &preview.assignments {
        let image = a.file_name().unwrap_or_else(|| "(sem capa)".to_string());
        p.say(format!("{}. {} -> {}", a.index + 1, a.title, image))?;
    }
    if let Some(warning) = &preview.warning {
        p.say(format!("\nAtenção: {}", warning))?;
    }
    p.confirm("\nConfirma a associação acima?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingMismatch;
    use crate::models::assignment::ImageAssignment;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn printed(p: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8_lossy(p.output()).to_string()
    }

    #[test]
    fn test_choose_mode_retries_invalid_option() {
        let mut p = prompter("3\n2\n");
        assert_eq!(choose_mode(&mut p).unwrap(), InputMode::Batch);
        assert!(printed(&p).contains("Opção inválida."));
    }

    #[test]
    fn test_choose_mode_eof() {
        let mut p = prompter("");
        let err = choose_mode(&mut p).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_collect_individual_reprompts_bad_fields() {
        let parser = RecordParser::new().unwrap();
        let input = "\
\n\
Culto de Domingo\n\
Pr. João\n\
31/02/2030\n\
10/03/2030\n\
7h\n\
19:30\n\
\n";
        let mut p = prompter(input);
        let records = collect_individual(&mut p, &parser).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Culto de Domingo");
        assert_eq!(records[0].date_text(), "10/03/2030");
        assert_eq!(records[0].time_text(), "19:30");

        let out = printed(&p);
        assert!(out.contains("Pelo menos uma transmissão deve ser informada."));
        assert_eq!(out.matches("Tente novamente.").count(), 2);
    }

    #[test]
    fn test_collect_individual_eof_drops_partial_record() {
        let parser = RecordParser::new().unwrap();
        let mut p = prompter("A\nP\n01/01/2030\n08:00\nB\nQ\n");
        let records = collect_individual(&mut p, &parser).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "A");
    }

    #[test]
    fn test_collect_batch_reports_ignored_blocks() {
        let parser = RecordParser::new().unwrap();
        let input = "Título: A\nPregador: P\nData: 15/04/2030\nHorário: 19:00\n\n\
                     Título: B\nPregador: Q\nData: 16/04/2030\n";
        let mut p = prompter(input);
        let parse = collect_batch(&mut p, &parser).unwrap();

        assert_eq!(parse.records.len(), 1);
        assert_eq!(parse.errors.len(), 1);
        assert!(printed(&p).contains("Aviso: transmissão ignorada (bloco 2, campo \"Horário\""));
    }

    #[test]
    fn test_confirm_preview_shows_missing_cover() {
        let preview = BindingPreview {
            assignments: vec![
                ImageAssignment {
                    index: 0,
                    title: "A".to_string(),
                    image: Some(PathBuf::from("capas/1.png")),
                },
                ImageAssignment {
                    index: 1,
                    title: "B".to_string(),
                    image: None,
                },
            ],
            warning: Some(BindingMismatch::MissingCovers {
                records: 2,
                images: 1,
                uncovered: vec![2],
            }),
        };
        let mut p = prompter("s\n");
        assert!(confirm_preview(&mut p, &preview).unwrap());

        let out = printed(&p);
        assert!(out.contains("1. A -> 1.png"));
        assert!(out.contains("2. B -> (sem capa)"));
        assert!(out.contains("Atenção: há 1 capas para 2 transmissões"));
    }
}
