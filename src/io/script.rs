//! Replay script reader with iterator interface
//!
//! A replay script is a CSV file with one invocation per row:
//!
//! ```text
//! creator,function,args
//! # the merchant registers its agent
//! MerchantMSP,/agent/add,AgentMSP
//! AgentMSP,/create,"{""paymentId"":""p-1"", ...}"
//! BankMSP,/meta/set,p-1,pnr,ABC123
//! ```
//!
//! The first two columns are the submitter's MSP id and the operation name;
//! every further column is one positional argument, so the column count
//! varies per row. Lines starting with `#` are skipped. JSON arguments are
//! quoted the usual CSV way.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found) are returned from `from_path()`
//! - Malformed rows are yielded as `Err` items carrying their line number

use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One scripted invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRow {
    /// Line of the row in the script, 1-based, header included
    pub line: u64,
    pub creator: String,
    pub function: String,
    pub args: Vec<String>,
}

/// Streaming reader over the rows of a replay script
#[derive(Debug)]
pub struct ScriptReader<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
}

impl ScriptReader<File> {
    /// Open a script file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open script '{}': {}", path.display(), e))?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> ScriptReader<R> {
    /// Read a script from any byte source
    pub fn from_reader(input: R) -> Self {
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .comment(Some(b'#'))
            .buffer_capacity(8 * 1024)
            .from_reader(input);

        Self {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl<R: Read> Iterator for ScriptReader<R> {
    type Item = Result<ScriptRow, String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(false) => None,
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or_default();
                Some(convert_record(line, &self.record))
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                Some(Err(format!("Line {}: CSV parse error: {}", line, e)))
            }
        }
    }
}

fn convert_record(line: u64, record: &StringRecord) -> Result<ScriptRow, String> {
    let mut fields = record.iter();
    let creator = fields.next().unwrap_or_default();
    let function = fields.next().unwrap_or_default();

    if creator.is_empty() {
        return Err(format!("Line {}: creator is empty", line));
    }
    if function.is_empty() {
        return Err(format!("Line {}: function is empty", line));
    }

    Ok(ScriptRow {
        line,
        creator: creator.to_string(),
        function: function.to_string(),
        args: fields.map(str::to_string).collect(),
    })
}
