//! Reply texts.

use mecho_catalog::{CanonicalId, Description, ListEntry, ReloadReport};

pub fn added(word: &str, id: &CanonicalId, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("Added meme: {id} (alias: {alias})"),
        None => format!("Added meme: {id}\nBind an alias with: /{word} name {id} <alias>"),
    }
}

pub fn awaiting(ttl_secs: i64) -> String {
    format!("OK, send an image within {ttl_secs} seconds and I will add it")
}

pub fn alias_bound(alias: &str, id: &CanonicalId) -> String {
    format!("Alias set: {alias} -> {id}")
}

pub fn not_found(query: &str) -> String {
    format!("Not found: {query}")
}

pub fn show(desc: &Description) -> String {
    let alias = desc.alias.as_deref().unwrap_or("(none)");
    let file = if desc.on_disk {
        desc.filename.clone()
    } else {
        format!("{} (missing)", desc.filename)
    };
    format!("ID: {}\nAlias: {alias}\nFile: {file}", desc.id)
}

/// Aliased entries first, then bare ids, capped at `limit` lines.
pub fn list(word: &str, entries: &[ListEntry], limit: usize) -> String {
    if entries.is_empty() {
        return format!("No memes stored yet. Add one with: /{word} add");
    }

    let aliased = entries.iter().filter(|e| e.alias.is_some());
    let bare = entries.iter().filter(|e| e.alias.is_none());
    let lines: Vec<String> = aliased
        .chain(bare)
        .take(limit)
        .map(|e| match &e.alias {
            Some(alias) => format!("{alias} -> {}", e.id),
            None => e.id.to_string(),
        })
        .collect();

    let mut out = format!("Stored:\n{}", lines.join("\n"));
    if entries.len() > limit {
        out.push_str(&format!("\n... {} in total, showing {limit}", entries.len()));
    }
    out
}

pub fn deleted(query: &str, id: &CanonicalId) -> String {
    format!("Deleted: {query} (ID={id})")
}

pub fn reloaded(report: &ReloadReport) -> String {
    format!(
        "Index rebuilt: {} entries ({} dangling aliases removed)",
        report.entries, report.pruned_aliases
    )
}

pub fn usage_for(word: &str, action: &str) -> String {
    match action {
        "name" => format!("Usage: /{word} name <ID|alias> <alias>"),
        "show" => format!("Usage: /{word} show <ID|alias>"),
        "del" => format!("Usage: /{word} del <ID|alias>"),
        _ => help(word),
    }
}

pub fn help(word: &str) -> String {
    format!(
        "Usage:\n\
         /{word} add                    add a meme\n\
         /{word} name <ID> <alias>      bind an alias\n\
         /{word} show <ID|alias>        show details\n\
         /{word} list                   list stored memes\n\
         /{word} del <ID|alias>         delete\n\
         /{word} reload                 rebuild the index"
    )
}
