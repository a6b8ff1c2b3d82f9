use crate::translation::LanguagePair;
use std::io::{self, BufRead, Write};

pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("id", "Indonesian"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("tr", "Turkish"),
];

pub fn language_name(code: &str) -> &str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("Unknown")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChoice {
    Files(Vec<String>),
    Exit,
}

pub struct Menu<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn header(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", "=".repeat(60))?;
        writeln!(self.output, "CSV TRANSLATION TOOL")?;
        writeln!(self.output, "{}", "=".repeat(60))
    }

    pub fn message(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Returns the chosen language code, or `None` if input ran out.
    pub fn select_language(&mut self, prompt: &str, default: Option<&str>) -> io::Result<Option<String>> {
        writeln!(self.output, "\n{}", prompt)?;
        writeln!(self.output, "{}", "-".repeat(40))?;

        for (i, pair) in SUPPORTED_LANGUAGES.chunks(2).enumerate() {
            let left = format!("{:2}. {} - {}", i * 2 + 1, pair[0].0, pair[0].1);
            match pair.get(1) {
                Some((code, name)) => {
                    writeln!(self.output, "{:<30} {:2}. {} - {}", left, i * 2 + 2, code, name)?
                }
                None => writeln!(self.output, "{}", left)?,
            }
        }

        if let Some(code) = default {
            writeln!(self.output, "\n 0. Use default ({} - {})", code, language_name(code))?;
        }

        loop {
            write!(
                self.output,
                "\nChoose a number (1-{}{}): ",
                SUPPORTED_LANGUAGES.len(),
                if default.is_some() { ", 0 for default" } else { "" }
            )?;
            let Some(choice) = self.read_line()? else {
                return Ok(None);
            };

            match choice.parse::<usize>() {
                Ok(0) if default.is_some() => return Ok(default.map(str::to_string)),
                Ok(n) if (1..=SUPPORTED_LANGUAGES.len()).contains(&n) => {
                    let (code, name) = SUPPORTED_LANGUAGES[n - 1];
                    writeln!(self.output, "Selected: {} ({})", name, code)?;
                    return Ok(Some(code.to_string()));
                }
                Ok(_) => writeln!(self.output, "Invalid choice!")?,
                Err(_) => writeln!(self.output, "Please enter a valid number!")?,
            }
        }
    }

    pub fn select_files(&mut self, available: &[String]) -> io::Result<FileChoice> {
        writeln!(self.output, "\nSELECT A CSV FILE TO TRANSLATE")?;
        writeln!(self.output, "{}", "-".repeat(40))?;
        for (i, name) in available.iter().enumerate() {
            writeln!(self.output, "{:2}. {}", i + 1, name)?;
        }
        let all = available.len() + 1;
        writeln!(self.output, "\n{:2}. Process ALL files", all)?;
        writeln!(self.output, " 0. Exit")?;

        loop {
            write!(self.output, "\nChoose a number (0-{}): ", all)?;
            let Some(choice) = self.read_line()? else {
                return Ok(FileChoice::Exit);
            };

            match choice.parse::<usize>() {
                Ok(0) => return Ok(FileChoice::Exit),
                Ok(n) if n == all => {
                    writeln!(self.output, "Selected: ALL files")?;
                    return Ok(FileChoice::Files(available.to_vec()));
                }
                Ok(n) if n >= 1 && n < all => {
                    let name = available[n - 1].clone();
                    writeln!(self.output, "Selected: {}", name)?;
                    return Ok(FileChoice::Files(vec![name]));
                }
                Ok(_) => writeln!(self.output, "Invalid choice!")?,
                Err(_) => writeln!(self.output, "Please enter a valid number!")?,
            }
        }
    }

    pub fn confirm(&mut self, pair: &LanguagePair, files: &[String]) -> io::Result<bool> {
        writeln!(self.output, "\n{}", "=".repeat(50))?;
        writeln!(self.output, "CONFIRM SETTINGS")?;
        writeln!(self.output, "{}", "=".repeat(50))?;
        writeln!(self.output, "Source language : {} ({})", language_name(&pair.source), pair.source)?;
        writeln!(self.output, "Target language : {} ({})", language_name(&pair.target), pair.target)?;
        writeln!(self.output, "Files to process:")?;
        for (i, name) in files.iter().enumerate() {
            writeln!(self.output, "   {}. {}", i + 1, name)?;
        }
        writeln!(self.output, "Total files     : {}", files.len())?;
        writeln!(self.output, "{}", "=".repeat(50))?;

        loop {
            write!(self.output, "Continue? (y/n): ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(false);
            };

            match answer.to_lowercase().as_str() {
                "y" | "yes" | "ya" => return Ok(true),
                "n" | "no" | "tidak" => {
                    writeln!(self.output, "Cancelled")?;
                    return Ok(false);
                }
                _ => writeln!(self.output, "Enter 'y' for yes or 'n' for no")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn menu(input: &str) -> Menu<Cursor<Vec<u8>>, Vec<u8>> {
        Menu::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_language_retries_until_valid() {
        let mut m = menu("abc\n99\n3\n");
        let code = m.select_language("Source:", Some("en")).unwrap();
        assert_eq!(code.as_deref(), Some("es"));

        let out = String::from_utf8(m.into_output()).unwrap();
        assert!(out.contains("Please enter a valid number!"));
        assert!(out.contains("Invalid choice!"));
        assert!(out.contains("16. tr - Turkish"));
    }

    #[test]
    fn test_language_default_and_eof() {
        assert_eq!(
            menu("0\n").select_language("Target:", Some("id")).unwrap().as_deref(),
            Some("id")
        );
        // 0 is not a choice without a default
        assert_eq!(menu("0\n").select_language("Target:", None).unwrap(), None);
    }

    #[test]
    fn test_file_choices() {
        let files = vec!["a.csv".to_string(), "b.csv".to_string()];
        assert_eq!(
            menu("2\n").select_files(&files).unwrap(),
            FileChoice::Files(vec!["b.csv".to_string()])
        );
        assert_eq!(menu("3\n").select_files(&files).unwrap(), FileChoice::Files(files.clone()));
        assert_eq!(menu("7\n0\n").select_files(&files).unwrap(), FileChoice::Exit);
        assert_eq!(menu("").select_files(&files).unwrap(), FileChoice::Exit);
    }

    #[test]
    fn test_confirm_answers() {
        let pair = LanguagePair::new("en", "id");
        let files = vec!["a.csv".to_string()];
        assert!(menu("maybe\nYa\n").confirm(&pair, &files).unwrap());
        assert!(!menu("tidak\n").confirm(&pair, &files).unwrap());
        assert!(!menu("").confirm(&pair, &files).unwrap());
    }
}
