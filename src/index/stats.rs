use crate::index::reader::IndexReader;
use anyhow::Result;
use std::path::Path;

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    let reader = IndexReader::open(index_path)?;

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index location:   {}", reader.index_path().display());
    println!("Index version:    {}", reader.meta.version);
    println!("Document count:   {}", reader.meta.doc_count);
    println!("Term count:       {}", reader.term_count());
    println!("Total tokens:     {}", reader.meta.total_tokens);
    println!("Avg doc length:   {:.2}", reader.meta.avg_doc_len());
    println!("Text codec:       {:?}", reader.meta.text_codec);

    if let Ok(size) = dir_size(index_path) {
        println!();
        println!("Index size:       {}", format_size(size));
    }

    Ok(())
}

/// Calculate total size of a directory
fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut size = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_file() {
            size += meta.len();
        }
    }
    Ok(size)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
