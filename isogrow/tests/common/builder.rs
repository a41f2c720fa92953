//! Synthesises small ECMA-119 images with an optional Joliet tree
#![allow(dead_code)]

use crate::common::{MemoryBlockDevice, SECTOR};

/// Recording date written into every directory record: 2017-07-01 12:30:15 UTC
pub const RECORD_DATE: [u8; 7] = [117, 7, 1, 12, 30, 15, 0];

/// Same instant in seconds since the epoch
pub const RECORD_SECONDS: i64 = 1_498_912_215;

struct DirSpec {
    primary: String,
    joliet: String,
    parent: u16,
}

struct FileSpec {
    dir: u16,
    primary: String,
    joliet: String,
    content: Vec<u8>,
    lba: Option<u32>,
}

/// Where one tree landed on the image
#[derive(Debug, Clone, Default)]
pub struct TreeLayout {
    pub l_table: u32,
    pub m_table: u32,
    pub dirs: Vec<u32>,
    /// Byte offset of each file's directory record, in `add_file` order
    pub records: Vec<usize>,
}

/// Where everything landed
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub primary: Option<TreeLayout>,
    pub joliet: Option<TreeLayout>,
    pub files: Vec<u32>,
    pub terminator: u32,
    pub total_sectors: u32,
}

impl Layout {
    /// Every directory record offset of file `index`, relative to the image start
    pub fn record_offsets(&self, index: usize) -> Vec<usize> {
        [&self.primary, &self.joliet]
            .into_iter()
            .flatten()
            .map(|tree| tree.records[index])
            .collect()
    }
}

pub struct IsoBuilder {
    volume_id: String,
    primary: bool,
    escape: Option<[u8; 3]>,
    identifier: [u8; 5],
    extra_descriptors: Vec<u8>,
    dirs: Vec<DirSpec>,
    files: Vec<FileSpec>,
    path_table_size: Option<u32>,
    root_size: u32,
    block_size: usize,
    start_sector: usize,
}

impl IsoBuilder {
    pub fn new() -> Self {
        Self {
            volume_id: "TEST_DISC".to_string(),
            primary: true,
            escape: None,
            identifier: *b"CD001",
            extra_descriptors: Vec::new(),
            dirs: vec![DirSpec {
                primary: String::new(),
                joliet: String::new(),
                parent: 1,
            }],
            files: Vec::new(),
            path_table_size: None,
            root_size: SECTOR as u32,
            block_size: SECTOR,
            start_sector: 0,
        }
    }

    /// Add a Joliet supplementary descriptor with these escape sequence bytes
    pub fn joliet(&mut self, escape: &[u8; 3]) -> &mut Self {
        self.escape = Some(*escape);
        self
    }

    /// Leave out the primary descriptor
    pub fn without_primary(&mut self) -> &mut Self {
        self.primary = false;
        self
    }

    /// Standard identifier written into the primary descriptor
    pub fn identifier(&mut self, identifier: &[u8; 5]) -> &mut Self {
        self.identifier = *identifier;
        self
    }

    /// Insert an extra descriptor of this type before the terminator
    pub fn extra_descriptor(&mut self, code: u8) -> &mut Self {
        self.extra_descriptors.push(code);
        self
    }

    /// Declared path table size, instead of the real one
    pub fn path_table_size(&mut self, size: u32) -> &mut Self {
        self.path_table_size = Some(size);
        self
    }

    /// Declared size of the root directory
    pub fn root_size(&mut self, size: u32) -> &mut Self {
        self.root_size = size;
        self
    }

    /// Block size the device reports
    pub fn block_size(&mut self, size: usize) -> &mut Self {
        self.block_size = size;
        self
    }

    /// Place the image this many sectors into the device
    pub fn start_sector(&mut self, sector: usize) -> &mut Self {
        self.start_sector = sector;
        self
    }

    /// Add a directory under `parent` (1 is the root); returns its path table index
    pub fn add_dir(&mut self, parent: u16, name: &str) -> u16 {
        self.dirs.push(DirSpec {
            primary: name.to_uppercase(),
            joliet: name.to_string(),
            parent,
        });
        self.dirs.len() as u16
    }

    /// Add a root file; the primary name is upper-cased with a `;1` suffix
    pub fn add_file(&mut self, name: &str, content: &[u8]) -> usize {
        self.push_file(1, name, content, None)
    }

    /// Add a file to directory `dir`
    pub fn add_file_in(&mut self, dir: u16, name: &str, content: &[u8]) -> usize {
        self.push_file(dir, name, content, None)
    }

    /// Add a root file whose data sits at a fixed sector
    pub fn add_file_at(&mut self, name: &str, content: &[u8], lba: u32) -> usize {
        self.push_file(1, name, content, Some(lba))
    }

    /// Add a root file with an exact primary name
    pub fn add_raw_file_at(&mut self, primary: &str, content: &[u8], lba: u32) -> usize {
        self.files.push(FileSpec {
            dir: 1,
            primary: primary.to_string(),
            joliet: primary.to_string(),
            content: content.to_vec(),
            lba: Some(lba),
        });
        self.files.len() - 1
    }

    fn push_file(&mut self, dir: u16, name: &str, content: &[u8], lba: Option<u32>) -> usize {
        self.files.push(FileSpec {
            dir,
            primary: format!("{};1", name.to_uppercase()),
            joliet: name.to_string(),
            content: content.to_vec(),
            lba,
        });
        self.files.len() - 1
    }

    pub fn build(&self) -> MemoryBlockDevice {
        self.build_with_layout().0
    }

    pub fn build_with_layout(&self) -> (MemoryBlockDevice, Layout) {
        let mut layout = Layout::default();
        let mut next = 16u32;
        let mut take = |count: u32| {
            let sector = next;
            next += count;
            sector
        };

        let pvd = self.primary.then(|| take(1));
        let svd = self.escape.map(|_| take(1));
        let extras: Vec<u32> = self.extra_descriptors.iter().map(|_| take(1)).collect();
        layout.terminator = take(1);

        let tree = |take: &mut dyn FnMut(u32) -> u32| TreeLayout {
            l_table: take(1),
            m_table: take(1),
            dirs: self.dirs.iter().map(|_| take(1)).collect(),
            records: Vec::new(),
        };
        if pvd.is_some() {
            layout.primary = Some(tree(&mut take));
        }
        if svd.is_some() {
            layout.joliet = Some(tree(&mut take));
        }
        layout.files = self
            .files
            .iter()
            .map(|file| {
                file.lba
                    .unwrap_or_else(|| take(sectors(file.content.len()).max(1)))
            })
            .collect();

        let end = self
            .files
            .iter()
            .zip(&layout.files)
            .map(|(file, &lba)| lba + sectors(file.content.len()).max(1))
            .max()
            .unwrap_or(0)
            .max(next);
        layout.total_sectors = end + 1;

        let mut data = vec![0u8; layout.total_sectors as usize * SECTOR];

        if let (Some(sector), Some(tree)) = (pvd, layout.primary.as_mut()) {
            self.write_tree(&mut data, tree, &layout.files, false);
            self.write_descriptor(&mut data, sector, 1, tree, layout.total_sectors, false);
        }
        if let (Some(sector), Some(tree)) = (svd, layout.joliet.as_mut()) {
            self.write_tree(&mut data, tree, &layout.files, true);
            self.write_descriptor(&mut data, sector, 2, tree, layout.total_sectors, true);
        }
        for (&sector, &code) in extras.iter().zip(&self.extra_descriptors) {
            write_header(&mut data, sector, code, b"CD001");
        }
        write_header(&mut data, layout.terminator, 255, b"CD001");

        for (file, &lba) in self.files.iter().zip(&layout.files) {
            let at = lba as usize * SECTOR;
            data[at..at + file.content.len()].copy_from_slice(&file.content);
        }

        let mut device = vec![0u8; self.start_sector * SECTOR];
        device.extend_from_slice(&data);
        (MemoryBlockDevice::with_block_size(device, self.block_size), layout)
    }

    fn name_bytes(&self, text: &str, joliet: bool) -> Vec<u8> {
        if joliet {
            ucs2(text)
        } else {
            text.as_bytes().to_vec()
        }
    }

    fn write_tree(&self, data: &mut [u8], tree: &mut TreeLayout, file_lbas: &[u32], joliet: bool) {
        // Path tables, L then M
        let mut l_table = Vec::new();
        let mut m_table = Vec::new();
        for (index, dir) in self.dirs.iter().enumerate() {
            let name = if index == 0 {
                vec![0]
            } else {
                self.name_bytes(if joliet { &dir.joliet } else { &dir.primary }, joliet)
            };
            let location = tree.dirs[index];
            for (table, big) in [(&mut l_table, false), (&mut m_table, true)] {
                table.push(name.len() as u8);
                table.push(0);
                if big {
                    table.extend_from_slice(&location.to_be_bytes());
                    table.extend_from_slice(&dir.parent.to_be_bytes());
                } else {
                    table.extend_from_slice(&location.to_le_bytes());
                    table.extend_from_slice(&dir.parent.to_le_bytes());
                }
                table.extend_from_slice(&name);
                if name.len() % 2 != 0 {
                    table.push(0);
                }
            }
        }
        let at = tree.l_table as usize * SECTOR;
        data[at..at + l_table.len()].copy_from_slice(&l_table);
        let at = tree.m_table as usize * SECTOR;
        data[at..at + m_table.len()].copy_from_slice(&m_table);

        // Directory contents
        tree.records = vec![0; self.files.len()];
        for (index, dir) in self.dirs.iter().enumerate() {
            let number = index as u16 + 1;
            let location = tree.dirs[index];
            let own_size = if index == 0 { self.root_size } else { SECTOR as u32 };
            let parent = tree.dirs[dir.parent as usize - 1];

            let mut offset = location as usize * SECTOR;
            write_record(data, &mut offset, location, own_size, 0x02, &[0]);
            write_record(data, &mut offset, parent, SECTOR as u32, 0x02, &[1]);
            for (child, spec) in self.dirs.iter().enumerate().skip(1) {
                if spec.parent == number {
                    let name = if joliet { &spec.joliet } else { &spec.primary };
                    let name = self.name_bytes(name, joliet);
                    let size = SECTOR as u32;
                    write_record(data, &mut offset, tree.dirs[child], size, 0x02, &name);
                }
            }
            for (f, file) in self.files.iter().enumerate() {
                if file.dir == number {
                    let name = if joliet { &file.joliet } else { &file.primary };
                    let name = self.name_bytes(name, joliet);
                    let size = file.content.len() as u32;
                    tree.records[f] = offset;
                    write_record(data, &mut offset, file_lbas[f], size, 0, &name);
                }
            }
        }
    }

    fn write_descriptor(
        &self,
        data: &mut [u8],
        sector: u32,
        code: u8,
        tree: &TreeLayout,
        total_sectors: u32,
        joliet: bool,
    ) {
        let identifier = if joliet { b"CD001" } else { &self.identifier };
        write_header(data, sector, code, identifier);
        let d = &mut data[sector as usize * SECTOR..(sector as usize + 1) * SECTOR];

        let mut volume_id = self.name_bytes(&self.volume_id, joliet);
        let pad: &[u8] = if joliet { &[0, b' '] } else { b" " };
        while volume_id.len() < 32 {
            volume_id.extend_from_slice(pad);
        }
        d[8..40].fill(b' ');
        d[40..72].copy_from_slice(&volume_id[..32]);
        both_u32(&mut d[80..], total_sectors);
        if let (true, Some(escape)) = (joliet, self.escape) {
            d[88..91].copy_from_slice(&escape);
        }
        both_u16(&mut d[120..], 1);
        both_u16(&mut d[124..], 1);
        both_u16(&mut d[128..], SECTOR as u16);

        let table_size = 10 + self.dirs[1..]
            .iter()
            .map(|dir| {
                let name = if joliet { &dir.joliet } else { &dir.primary };
                let len = self.name_bytes(name, joliet).len();
                8 + len + len % 2
            })
            .sum::<usize>();
        both_u32(&mut d[132..], self.path_table_size.unwrap_or(table_size as u32));
        d[140..144].copy_from_slice(&tree.l_table.to_le_bytes());
        d[148..152].copy_from_slice(&tree.m_table.to_be_bytes());

        let mut root = 156;
        write_record(d, &mut root, tree.dirs[0], self.root_size, 0x02, &[0]);

        d[813..829].copy_from_slice(b"2017070112301500");
        d[881] = 1;
    }
}

pub fn sectors(len: usize) -> u32 {
    len.div_ceil(SECTOR) as u32
}

/// UCS-2 big-endian encoding
pub fn ucs2(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|unit| unit.to_be_bytes()).collect()
}

fn write_header(data: &mut [u8], sector: u32, code: u8, identifier: &[u8; 5]) {
    let at = sector as usize * SECTOR;
    data[at] = code;
    data[at + 1..at + 6].copy_from_slice(identifier);
    data[at + 6] = 1;
}

fn both_u32(dst: &mut [u8], value: u32) {
    dst[0..4].copy_from_slice(&value.to_le_bytes());
    dst[4..8].copy_from_slice(&value.to_be_bytes());
}

fn both_u16(dst: &mut [u8], value: u16) {
    dst[0..2].copy_from_slice(&value.to_le_bytes());
    dst[2..4].copy_from_slice(&value.to_be_bytes());
}

fn write_record(data: &mut [u8], offset: &mut usize, lba: u32, size: u32, flags: u8, name: &[u8]) {
    let mut length = 33 + name.len();
    if length % 2 != 0 {
        length += 1;
    }
    let start = *offset;
    data[start] = length as u8;
    data[start + 1] = 0;
    both_u32(&mut data[start + 2..], lba);
    both_u32(&mut data[start + 10..], size);
    data[start + 18..start + 25].copy_from_slice(&RECORD_DATE);
    data[start + 25] = flags;
    both_u16(&mut data[start + 28..], 1);
    data[start + 32] = name.len() as u8;
    data[start + 33..start + 33 + name.len()].copy_from_slice(name);
    *offset += length;
}
