//! Paged printing of ranked results with highlighted occurrences

use crate::index::reader::IndexReader;
use crate::query::highlight::HighlightContext;
use crate::query::rank::{RankHit, RankedResults};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print every result page to stdout. Returns the total page count.
pub fn print_pages(
    results: &RankedResults,
    reader: &IndexReader,
    page_size: usize,
    max_text_bytes: usize,
    color: bool,
) -> io::Result<usize> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    let pages = write_pages(&mut stdout, results, reader, page_size, max_text_bytes)?;

    writeln!(stdout, "result(s): {} pages.", pages)?;
    Ok(pages)
}

/// Write all pages of `results`. Returns the total page count.
pub fn write_pages<W: WriteColor>(
    out: &mut W,
    results: &RankedResults,
    reader: &IndexReader,
    page_size: usize,
    max_text_bytes: usize,
) -> io::Result<usize> {
    let total_pages = results.window(0, page_size).total_pages;

    for page in 0..total_pages {
        let window = results.window(page, page_size);
        if window.is_empty() {
            continue;
        }

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(out, "page#{} (from {} to {}):", page + 1, window.from, window.to)?;
        out.reset()?;

        for (i, hit) in results.hits()[window.from..window.to].iter().enumerate() {
            write_hit(out, window.from + i, hit, reader, max_text_bytes)?;
        }
    }

    Ok(total_pages)
}

fn write_hit<W: WriteColor>(
    out: &mut W,
    rank: usize,
    hit: &RankHit,
    reader: &IndexReader,
    max_text_bytes: usize,
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(out, "result#{}:", rank)?;
    out.reset()?;
    writeln!(out, " doc#{} score={:.3}", hit.doc_id, hit.score)?;

    let highlight = HighlightContext::new(&hit.occurs);
    write!(out, "occurs: ")?;
    for pos in highlight.occurs() {
        write!(out, "{} ", pos)?;
    }
    writeln!(out)?;

    match reader.urls().read_text(hit.doc_id, max_text_bytes) {
        Ok(url) => {
            write!(out, "URL: ")?;
            out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            write!(out, "{}", url)?;
            out.reset()?;
            writeln!(out, "\n")?;
        }
        Err(err) => {
            tracing::warn!(doc_id = hit.doc_id, error = %err, "URL unavailable");
            writeln!(out, "URL: (unavailable)\n")?;
        }
    }

    match reader.texts().read_text(hit.doc_id, max_text_bytes) {
        Ok(text) => {
            for seg in highlight.select(&text) {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
                write!(out, "`{}'", seg.text)?;
                out.reset()?;
                writeln!(out, " [{}, {}]", seg.offset, seg.len)?;
            }
        }
        Err(err) => {
            // Only this result loses its content
            tracing::warn!(doc_id = hit.doc_id, error = %err, "document text unavailable");
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            writeln!(out, "(content unavailable)")?;
            out.reset()?;
        }
    }

    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use crate::index::writer::IndexWriter;
    use crate::query::{MergeOp, QueryExecutor};
    use tempfile::TempDir;
    use termcolor::NoColor;

    #[test]
    fn test_page_format() {
        let dir = TempDir::new().unwrap();
        let mut writer = IndexWriter::new(dir.path()).unwrap();
        writer.add_document("zootopia.txt", "Nick Wilde meets Judy").unwrap();
        writer.add_document("other.txt", "nothing here").unwrap();
        writer.commit().unwrap();
        let reader = IndexReader::open(dir.path()).unwrap();

        let executor = QueryExecutor::new(&reader, &SearchConfig::default());
        let results = executor.execute_query(&["nick", "wilde"], MergeOp::Or).unwrap();

        let mut out = NoColor::new(Vec::new());
        let pages = write_pages(&mut out, &results, &reader, 10, 1 << 20).unwrap();
        assert_eq!(pages, 1);

        let text = String::from_utf8(out.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "page#1 (from 0 to 1):");
        assert!(lines[1].starts_with("result#0: doc#1 score="));
        assert_eq!(lines[2], "occurs: 0 1 ");
        assert_eq!(lines[3], "URL: zootopia.txt");
        assert_eq!(lines[5], "`Nick' [0, 4]");
        assert_eq!(lines[6], "`Wilde' [5, 5]");
    }

    #[test]
    fn test_no_results() {
        let dir = TempDir::new().unwrap();
        IndexWriter::new(dir.path()).unwrap().commit().unwrap();
        let reader = IndexReader::open(dir.path()).unwrap();

        let mut out = NoColor::new(Vec::new());
        let pages = write_pages(&mut out, &RankedResults::default(), &reader, 10, 64).unwrap();
        assert_eq!(pages, 0);
        assert!(out.into_inner().is_empty());
    }
}
