// probably not necesarry as consts but reads better than literals
pub const U8_CHAR_NEWLINE: u8 = b'\n';
pub const U8_CHAR_FASTQ_RECORD: u8 = b'@';
pub const U8_CHAR_FASTQ_SEPERATOR: u8 = b'+';

pub const MATE_SUFFIX_R1: &[u8] = b"/1";
pub const MATE_SUFFIX_R2: &[u8] = b"/2";

// R2 layout: [insert 0..150][barcode 150..166]
pub const R2_READ_LENGTH: usize = 166;
pub const R2_INSERT_LENGTH: usize = 150;
pub const R2_BARCODE_LENGTH: usize = R2_READ_LENGTH - R2_INSERT_LENGTH;
