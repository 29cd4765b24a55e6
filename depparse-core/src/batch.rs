//! # Processamento em Lote
//!
//! Lê um arquivo com uma sentença por linha e grava um bloco de linhas
//! tab-separadas por sentença, cada bloco seguido de uma linha em branco.
//!
//! - Linhas em branco da entrada são ignoradas.
//! - As sentenças são analisadas de forma independente, em paralelo com rayon
//!   (se habilitado); a saída segue sempre a ordem da entrada.
//! - A saída é escrita num arquivo temporário no mesmo diretório e só então
//!   renomeada sobre o destino. Um lote abortado não deixa arquivo parcial.

use std::fs;
use std::io::Write;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::config::{BatchOptions, MalformedPolicy};
use crate::error::{Error, Result};
use crate::pipeline::{DepParsePipeline, InputFormat};
use crate::tree::ParsedSentence;

/// Uma linha da entrada que não foi analisada.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiagnostic {
    /// Número da linha (base 1).
    pub line: usize,
    pub text: String,
    pub reason: String,
}

/// Resumo de um lote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Linhas não vazias lidas.
    pub sentences_read: usize,
    /// Blocos gravados na saída.
    pub sentences_written: usize,
    /// Linhas malformadas puladas (política `Skip`).
    pub skipped: Vec<LineDiagnostic>,
}

/// Executa o lote `input` → `output`.
pub fn run(
    pipeline: &DepParsePipeline,
    input: &Path,
    output: &Path,
    format: InputFormat,
    opts: &BatchOptions,
) -> Result<BatchReport> {
    let text = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line))
        .collect();

    let with_lemmas = opts.parse.with_lemmas;
    let outcomes = parse_lines(&lines, opts, |line| pipeline.analyze_format(line, format, with_lemmas))?;

    let mut report = BatchReport {
        sentences_read: lines.len(),
        ..BatchReport::default()
    };
    let mut buffer = String::new();
    for outcome in outcomes {
        match outcome {
            Ok(sentence) => {
                buffer.push_str(&sentence.to_rows());
                buffer.push('\n');
                report.sentences_written += 1;
            }
            Err(diagnostic) => {
                warn!(line = diagnostic.line, reason = %diagnostic.reason, "linha malformada ignorada");
                report.skipped.push(diagnostic);
            }
        }
    }

    write_atomically(output, buffer.as_bytes())?;
    info!(
        input = %input.display(),
        output = %output.display(),
        read = report.sentences_read,
        written = report.sentences_written,
        skipped = report.skipped.len(),
        "lote concluído"
    );
    Ok(report)
}

/// Analisa as linhas na ordem de entrada, parando no primeiro erro que aborta o lote.
///
/// O erro externo é fatal (ou malformado sob `FailFast`) e interrompe as demais
/// análises; o interno é uma linha pulada sob `Skip`.
fn parse_lines<F>(
    lines: &[(usize, &str)],
    opts: &BatchOptions,
    parse: F,
) -> Result<Vec<std::result::Result<ParsedSentence, LineDiagnostic>>>
where
    F: Fn(&str) -> Result<ParsedSentence> + Sync,
{
    let policy = opts.on_malformed;
    let check = |&(number, line): &(usize, &str)| match parse(line) {
        Ok(sentence) => Ok(Ok(sentence)),
        Err(err) if !err.is_fatal() && policy == MalformedPolicy::Skip => Ok(Err(LineDiagnostic {
            line: number,
            text: line.to_string(),
            reason: err.to_string(),
        })),
        Err(err) => Err(err),
    };
    if opts.parallel {
        lines.par_iter().map(check).collect()
    } else {
        lines.iter().map(check).collect()
    }
}

/// Grava num temporário ao lado do destino e renomeia por cima dele.
fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(output).map_err(|e| Error::io(output, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParserModel;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EXPECTED: &str = "I\tPRP\t1\tSUB\nam\tVBP\t-1\tROOT\ngoing\tVBG\t1\tVC\nto\tTO\t2\tVMOD\n\
                            the\tDT\t5\tNMOD\nmarket\tNN\t3\tPMOD\n.\t.\t1\tP\n\n\
                            Are\tVBP\t-1\tROOT\nyou\tPRP\t0\tSUB\ngoing\tVBG\t0\tVMOD\nto\tTO\t4\tVMOD\n\
                            come\tVB\t2\tVMOD\nwith\tIN\t4\tVMOD\nme\tPRP\t5\tPMOD\n?\t.\t0\tP\n\n";
    const LEMMAS: [&str; 15] = [
        "i", "be", "go", "to", "the", "market", ".", "be", "you", "go", "to", "come", "with", "me", "?",
    ];

    fn pipeline() -> DepParsePipeline {
        DepParsePipeline::new().unwrap()
    }

    fn write_input(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn expected_with_lemmas() -> String {
        let mut lemmas = LEMMAS.iter();
        EXPECTED
            .split_inclusive('\n')
            .map(|row| {
                if row == "\n" {
                    row.to_string()
                } else {
                    format!("{}\t{}\n", row.trim_end_matches('\n'), lemmas.next().unwrap())
                }
            })
            .collect()
    }

    fn check(tokenize: bool, with_lemmas: bool, tagged: bool) {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline();
        let output = dir.path().join("out.dep");
        let report = if tagged {
            let input = write_input(
                &dir,
                "tagged.txt",
                "I/PRP am/VBP going/VBG to/TO the/DT market/NN ./.\n\
                 Are/VBP you/PRP going/VBG to/TO come/VB with/IN me/PRP ?/.\n",
            );
            p.parse_tagged_file(&input, &output, with_lemmas).unwrap()
        } else if tokenize {
            let input = write_input(&dir, "raw.txt", "I am going to the market.\nAre you going to come with me?\n");
            p.parse_file(&input, &output, true, with_lemmas).unwrap()
        } else {
            let input = write_input(
                &dir,
                "tokens.txt",
                "I am going to the market .\nAre you going to come with me ?\n",
            );
            p.parse_file(&input, &output, false, with_lemmas).unwrap()
        };
        assert_eq!(report.sentences_read, 2);
        assert_eq!(report.sentences_written, 2);

        let written = fs::read_to_string(&output).unwrap();
        if with_lemmas {
            assert_eq!(written, expected_with_lemmas());
        } else {
            assert_eq!(written, EXPECTED);
        }
    }

    #[test]
    fn test_parse_file_all_modes() {
        for tokenize in [true, false] {
            for with_lemmas in [true, false] {
                for tagged in [true, false] {
                    check(tokenize, with_lemmas, tagged);
                }
            }
        }
    }

    #[test]
    fn test_blank_lines_are_ignored_and_order_kept() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "in.txt", "\nHe is a doctor.\n\n   \nIt is raining again.\n");
        let output = dir.path().join("out.dep");
        let report = pipeline().parse_file(&input, &output, true, false).unwrap();
        assert_eq!(report.sentences_read, 2);

        let written = fs::read_to_string(&output).unwrap();
        let blocks: Vec<&str> = written.split("\n\n").filter(|b| !b.is_empty()).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("He\t"));
        assert!(blocks[1].starts_with("It\t"));
        assert!(written.ends_with("\n\n"));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let dir = tempfile::tempdir().unwrap();
        let lines: String = (0..40)
            .map(|i| match i % 4 {
                0 => "The cat sat on the mat.\n",
                1 => "Do you like coffee?\n",
                2 => "My sister works at a bank.\n",
                _ => "We went to the beach on Sunday.\n",
            })
            .collect();
        let input = write_input(&dir, "in.txt", &lines);
        let par = dir.path().join("par.dep");
        let seq = dir.path().join("seq.dep");
        let p = pipeline();
        let opts = BatchOptions::new(true, true);
        p.parse_file_with(&input, &par, InputFormat::Raw, &opts).unwrap();
        p.parse_file_with(&input, &seq, InputFormat::Raw, &opts.sequential()).unwrap();
        assert_eq!(fs::read_to_string(par).unwrap(), fs::read_to_string(seq).unwrap());
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "in.txt", "He/PRP is/VBZ here/RB\nbroken line/NN\nGo/VB ./.\n");
        let output = dir.path().join("out.dep");
        let report = pipeline().parse_tagged_file(&input, &output, false).unwrap();
        assert_eq!(report.sentences_read, 3);
        assert_eq!(report.sentences_written, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 2);
        assert_eq!(report.skipped[0].text, "broken line/NN");

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.matches("\n\n").count(), 2);
        assert!(written.contains("Go\tVB\t"));
    }

    #[test]
    fn test_fail_fast_leaves_existing_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "in.txt", "He/PRP is/VBZ here/RB\nbroken line/NN\n");
        let output = write_input(&dir, "out.dep", "conteúdo anterior\n");
        let opts = BatchOptions::new(false, false).fail_fast();
        let err = pipeline()
            .parse_file_with(&input, &output, InputFormat::Tagged, &opts)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "conteúdo anterior\n");
    }

    #[test]
    fn test_fatal_error_aborts_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "in.txt", "I am here.\n");
        let output = dir.path().join("out.dep");
        let p = DepParsePipeline::with_model(ParserModel::empty());
        let err = p.parse_file(&input, &output, true, false).unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_existing_output_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(&dir, "in.txt", "It is raining again.\n");
        let output = write_input(&dir, "out.dep", "lixo antigo\nlixo antigo\nlixo antigo\n");
        pipeline().parse_file(&input, &output, true, false).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("lixo"));
        assert!(written.starts_with("It\tPRP\t1\tSUB\n"));
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pipeline()
            .parse_file(dir.path().join("nada.txt"), dir.path().join("out.dep"), true, false)
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    fn numbered(count: usize, text: &'static str) -> Vec<(usize, &'static str)> {
        (1..=count).map(|i| (i, text)).collect()
    }

    #[test]
    fn test_fatal_error_on_first_line_stops_the_batch() {
        let lines = numbered(50, "qualquer coisa");
        let calls = AtomicUsize::new(0);
        let err = parse_lines(&lines, &BatchOptions::default().sequential(), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::InternalConsistency("sem transição legal".into()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::InternalConsistency(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fail_fast_stops_at_first_malformed_line() {
        let mut lines = numbered(50, "ok/NN");
        lines[0].1 = "quebrada";
        let calls = AtomicUsize::new(0);
        let parse = |line: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            if line == "quebrada" {
                Err(Error::malformed(line, "sem /TAG"))
            } else {
                Ok(ParsedSentence::default())
            }
        };

        let opts = BatchOptions::default().fail_fast().sequential();
        let err = parse_lines(&lines, &opts, parse).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Sob Skip a linha vira diagnóstico e as demais seguem
        calls.store(0, Ordering::SeqCst);
        let outcomes = parse_lines(&lines, &BatchOptions::default().sequential(), parse).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 50);
        assert_eq!(outcomes.len(), 50);
        assert!(matches!(&outcomes[0], Err(d) if d.line == 1 && d.text == "quebrada"));
        assert!(outcomes[1..].iter().all(|o| o.is_ok()));
    }

    #[test]
    fn test_parallel_batch_propagates_fatal_error() {
        let lines = numbered(200, "qualquer coisa");
        let err = parse_lines(&lines, &BatchOptions::default(), |line| {
            Err(Error::model_unavailable("tagger.json", format!("sem pesos para {line}")))
        })
        .unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
    }
}

