use chatlens_core::ports::{Result, StopwordSource, TranscriptSource};
use chatlens_core::ChatError;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Reads an exported transcript from a UTF-8 text file
pub struct FileTranscriptSource {
    path: PathBuf,
}

impl FileTranscriptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TranscriptSource for FileTranscriptSource {
    fn read_transcript(&self) -> Result<String> {
        let text = fs::read_to_string(&self.path)?;
        debug!("Read {} bytes from {}", text.len(), self.path.display());
        Ok(text)
    }
}

/// Reads a newline-separated stopword list
pub struct FileStopwordSource {
    path: PathBuf,
}

impl FileStopwordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StopwordSource for FileStopwordSource {
    fn load_stopwords(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Err(ChatError::StopwordsMissing(self.path.clone()));
        }

        let contents = fs::read_to_string(&self.path)?;
        let words: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        debug!("Loaded {} stopwords from {}", words.len(), self.path.display());
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_transcript() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1/2/23, 8:00 AM - Alice: hi\n").unwrap();
        let source = FileTranscriptSource::new(file.path());
        assert_eq!(source.read_transcript().unwrap(), "1/2/23, 8:00 AM - Alice: hi\n");
    }

    #[test]
    fn test_read_transcript_missing_file_is_io_error() {
        let source = FileTranscriptSource::new("/definitely/not/here.txt");
        assert!(matches!(source.read_transcript(), Err(ChatError::Io(_))));
    }

    #[test]
    fn test_load_stopwords_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "hai\n\n  ke \nnahi\r\n").unwrap();
        let words = FileStopwordSource::new(file.path()).load_stopwords().unwrap();
        assert_eq!(words, vec!["hai", "ke", "nahi"]);
    }

    #[test]
    fn test_load_stopwords_missing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roman-urdu-stopwords.txt");
        match FileStopwordSource::new(&path).load_stopwords() {
            Err(ChatError::StopwordsMissing(missing)) => assert_eq!(missing, path),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
