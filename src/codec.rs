//! Reading and writing partition lists.
//!
//! Two input formats are understood: the versioned JSON document used for
//! partition reassignments, and the plain text printed by the Kafka topic
//! describe tool. Output is always JSON.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{BrokerId, Partition, PartitionId, PartitionList};

static DESCRIBE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\tTopic: ([^\t]*)\tPartition: ([0-9]*)\tLeader: ([0-9]*)\tReplicas: ([0-9,]*)\tIsr: ([0-9,]*)",
    )
    .expect("hard-coded regular expression to be valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    /// `kafka-topics --describe` output
    Text,
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("failed reading input: {0}")]
    Io(#[from] io::Error),

    #[error("failed parsing json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("wrong partition list version: expected {expected}, got {0}", expected = PartitionList::VERSION)]
    UnsupportedVersion(u32),

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("empty partition list")]
    Empty,
}

/// Parse a partition list, rejecting lists without partitions
pub fn parse_partition_list<R: Read>(
    reader: R,
    format: InputFormat,
) -> Result<PartitionList, CodecError> {
    let list = match format {
        InputFormat::Json => parse_json(reader)?,
        InputFormat::Text => parse_text(BufReader::new(reader))?,
    };

    if list.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(list)
}

fn parse_json<R: Read>(reader: R) -> Result<PartitionList, CodecError> {
    let list: PartitionList = serde_json::from_reader(reader)?;
    if list.version != PartitionList::VERSION {
        return Err(CodecError::UnsupportedVersion(list.version));
    }
    Ok(list)
}

fn parse_text<R: BufRead>(reader: R) -> Result<PartitionList, CodecError> {
    let mut partitions = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(caps) = DESCRIBE_LINE.captures(&line) else {
            continue;
        };

        let malformed = |reason: String| CodecError::MalformedLine {
            line: idx + 1,
            reason,
        };

        let partition = caps[2]
            .parse::<PartitionId>()
            .map_err(|_| malformed(format!("invalid partition id {:?}", &caps[2])))?;
        let replicas = caps[4]
            .split(',')
            .map(|id| id.parse::<BrokerId>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed(format!("invalid replica list {:?}", &caps[4])))?;

        partitions.push(Partition::new(&caps[1], partition, replicas));
    }

    Ok(PartitionList::new(partitions))
}

/// Write a partition list as compact JSON followed by a newline
pub fn write_partition_list<W: Write>(mut writer: W, list: &PartitionList) -> Result<(), CodecError> {
    serde_json::to_writer(&mut writer, list)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
