use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

/// Une ligne saisie, avec l'ensemble d'entités actif au moment de la saisie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub entity_set: Option<String>,
    pub line: String,
}

impl HistoryEntry {
    /// Format du fichier: `<ensemble>\t<ligne>`, ensemble vide si aucun
    fn to_record(&self) -> String {
        format!("{}\t{}", self.entity_set.as_deref().unwrap_or(""), self.line)
    }

    fn from_record(record: &str) -> Option<Self> {
        let (set, line) = match record.split_once('\t') {
            Some((set, line)) => (set.trim(), line.trim()),
            // Anciennes lignes sans ensemble
            None => ("", record.trim()),
        };
        if line.is_empty() {
            return None;
        }
        Some(HistoryEntry {
            entity_set: (!set.is_empty()).then(|| set.to_string()),
            line: line.to_string(),
        })
    }
}

/// Historique des saisies du REPL, rattachées à leur ensemble d'entités
pub struct History {
    file_path: PathBuf,
    entries: Vec<HistoryEntry>,
    max_size: usize,
}

impl History {
    pub fn new<P: AsRef<Path>>(file_path: P, max_size: usize) -> Self {
        History {
            file_path: file_path.as_ref().to_path_buf(),
            entries: Vec::new(),
            max_size,
        }
    }

    /// Charge l'historique depuis le fichier s'il existe
    pub fn load(&mut self) -> Result<()> {
        if !self.file_path.exists() {
            return Ok(());
        }

        let text = fs::read_to_string(&self.file_path)?;
        self.entries = text.lines().filter_map(HistoryEntry::from_record).collect();

        if self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(..excess);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let records: Vec<String> = self.entries.iter().map(HistoryEntry::to_record).collect();
        fs::write(&self.file_path, records.join("\n") + "\n")?;
        Ok(())
    }

    /// Ajoute une saisie; une répétition immédiate dans le même ensemble est ignorée
    pub fn add(&mut self, entity_set: Option<&str>, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let entry = HistoryEntry {
            entity_set: entity_set.map(str::to_string),
            line: line.to_string(),
        };
        if self.entries.last() == Some(&entry) {
            return;
        }

        self.entries.push(entry);
        if self.entries.len() > self.max_size {
            self.entries.remove(0);
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Lignes seules, pour l'éditeur
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.line.as_str())
    }

    /// Entrée numérotée à partir de 1, comme affiché par `.history`
    pub fn get(&self, number: usize) -> Option<&HistoryEntry> {
        number.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Entrées (avec leur numéro) dont la ligne ou l'ensemble contient le motif
    pub fn search(&self, pattern: &str) -> Vec<(usize, &HistoryEntry)> {
        self.numbered()
            .filter(|(_, e)| {
                e.line.contains(pattern)
                    || e.entity_set.as_deref().map_or(false, |set| set.contains(pattern))
            })
            .collect()
    }

    pub fn numbered(&self) -> impl Iterator<Item = (usize, &HistoryEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_entries_keep_their_entity_set() {
        let mut history = History::new("unused.txt", 3);
        history.add(Some("Products"), "Price gt 10");
        history.add(Some("Products"), "Price gt 10");
        history.add(Some("Orders"), "Price gt 10");
        history.add(None, "   ");
        history.add(None, ".sets");
        history.add(None, ".help");

        let sets: Vec<Option<&str>> = history.entries().iter().map(|e| e.entity_set.as_deref()).collect();
        assert_eq!(sets, vec![Some("Orders"), None, None]);

        let found = history.search("Orders");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, 1);
        assert_eq!(history.get(1).map(|e| e.line.as_str()), Some("Price gt 10"));
        assert!(history.get(0).is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.txt");

        let mut history = History::new(&path, 10);
        history.add(None, ".set Products");
        history.add(Some("Products"), "ProductName eq 'Chai'");
        history.save().unwrap();

        let mut reloaded = History::new(&path, 10);
        reloaded.load().unwrap();
        assert_eq!(reloaded.entries(), history.entries());
        assert_eq!(reloaded.lines().collect::<Vec<_>>(), vec![".set Products", "ProductName eq 'Chai'"]);
    }

    #[test]
    fn test_load_plain_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.txt");
        fs::write(&path, "Price gt 10\n\nCategories\tProducts.Any()\n").unwrap();

        let mut history = History::new(&path, 10);
        history.load().unwrap();
        assert_eq!(history.entries().len(), 2);
        assert_eq!(history.entries()[0].entity_set, None);
        assert_eq!(history.entries()[1].entity_set.as_deref(), Some("Categories"));
    }
}
