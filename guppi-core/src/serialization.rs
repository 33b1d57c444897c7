use std::{
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write},
    path::Path,
};

use guppi_types::{
    keys, BitDepth, BlockDescriptor, GuppiError, GuppiHeader, GuppiResult,
};
use log::{debug, trace};

use crate::{
    binary::{read_data_region, skip_padding, write_padding},
    format::{data_padding, GuppiHeaderExt, DATA_PAD_FILL},
    geometry::BlockGeometry,
    session::SessionState,
    tensor::SampleTensor,
    unpack::SampleCodec,
};

/// Размер слота заголовка в dump-файлах hashpipe: 5 × 80 × 512 байт.
pub const DUMP_HEADER_SLOT: usize = 5 * 80 * 512;

/// Размер слота данных в dump-файлах hashpipe: 128 МБ.
pub const DUMP_DATA_SLOT: usize = 128 * 1024 * 1024;

/// Способ разбиения потока на блоки.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockLayout {
    /// Обычный GUPPI RAW: заголовок, данные, выравнивание DIRECTIO.
    #[default]
    Stream,
    /// Слоты фиксированного размера: остаток каждого слота пропускается.
    FixedSlots {
        header_bytes: usize,
        data_bytes: usize,
    },
}

impl BlockLayout {
    /// Раскладка dump-файлов hashpipe.
    pub fn dumpfile() -> Self {
        BlockLayout::FixedSlots {
            header_bytes: DUMP_HEADER_SLOT,
            data_bytes: DUMP_DATA_SLOT,
        }
    }
}

/// Декодированный блок.
#[derive(Debug, Clone)]
pub struct GuppiBlock {
    pub header: GuppiHeader,
    pub descriptor: BlockDescriptor,
    pub geometry: BlockGeometry,
    pub data: SampleTensor,
}

/// Блок без распаковки выборок.
///
/// `data` указывает во внутренний буфер читателя и становится недоступной
/// при следующем чтении.
#[derive(Debug)]
pub struct RawBlock<'a> {
    pub header: GuppiHeader,
    pub descriptor: BlockDescriptor,
    pub geometry: BlockGeometry,
    pub data: &'a [u8],
}

/// Статистика, накопленная [`GuppiReader`] в процессе чтения.
#[derive(Debug, Default, Clone)]
pub struct ReadStats {
    /// Успешно прочитанных блоков.
    pub blocks_read: u64,
    /// Всего обработано байт (заголовки, данные, выравнивание).
    pub bytes_processed: u64,
    /// Распаковано комплексных выборок.
    pub samples_decoded: u64,
}

/// Потоковый читатель GUPPI RAW.
///
/// Блоки читаются по одному; геометрия каждого блока сверяется с первым
/// блоком потока. После первой ошибки читатель больше ничего не отдаёт.
pub struct GuppiReader<R: Read> {
    reader: BufReader<R>,
    layout: BlockLayout,
    session: SessionState,
    scratch: Vec<u8>,
    stats: ReadStats,
    failed: bool,
}

/// Потоковый писатель GUPPI RAW.
pub struct GuppiWriter<W: Write> {
    writer: BufWriter<W>,
    bit_depth: BitDepth,
    block_count: u64,
    bytes_written: u64,
}

impl<R: Read> GuppiReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_layout(inner, BlockLayout::Stream)
    }

    pub fn with_layout(
        inner: R,
        layout: BlockLayout,
    ) -> Self {
        Self {
            reader: BufReader::new(inner),
            layout,
            session: SessionState::new(),
            scratch: Vec::new(),
            stats: ReadStats::default(),
            failed: false,
        }
    }

    /// Возвращает следующий блок или `None` на чистом конце потока.
    pub fn next_block(&mut self) -> Option<GuppiResult<GuppiBlock>> {
        let (header, descriptor, geometry) = match self.read_block()? {
            Ok(parts) => parts,
            Err(e) => return Some(Err(e)),
        };

        let decoded = descriptor
            .bit_depth
            .decode(&self.scratch)
            .and_then(|samples| SampleTensor::from_samples(&geometry, samples));

        match decoded {
            Ok(data) => {
                self.stats.samples_decoded += data.len() as u64;
                debug!(
                    "block {}: {} samples, shape {:?}",
                    self.stats.blocks_read - 1,
                    data.len(),
                    data.shape()
                );
                Some(Ok(GuppiBlock {
                    header,
                    descriptor,
                    geometry,
                    data,
                }))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    /// Возвращает следующий блок без распаковки выборок.
    pub fn next_raw_block(&mut self) -> Option<GuppiResult<RawBlock<'_>>> {
        match self.read_block()? {
            Ok((header, descriptor, geometry)) => Some(Ok(RawBlock {
                header,
                descriptor,
                geometry,
                data: &self.scratch,
            })),
            Err(e) => Some(Err(e)),
        }
    }

    /// Дескриптор первого блока потока, если он уже известен.
    pub fn session(&self) -> Option<&BlockDescriptor> {
        self.session.descriptor()
    }

    /// Накопленная статистика чтения.
    pub fn stats(&self) -> &ReadStats {
        &self.stats
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn read_block(&mut self) -> Option<GuppiResult<(GuppiHeader, BlockDescriptor, BlockGeometry)>> {
        if self.failed {
            return None;
        }

        match self.read_block_inner() {
            Ok(Some(parts)) => Some(Ok(parts)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    fn read_block_inner(&mut self) -> GuppiResult<Option<(GuppiHeader, BlockDescriptor, BlockGeometry)>> {
        let Some(mut header) = GuppiHeader::parse_from(&mut self.reader)? else {
            return Ok(None);
        };

        if let BlockLayout::FixedSlots { header_bytes, .. } = self.layout {
            let used = header.header_size();
            if used > header_bytes {
                return Err(GuppiError::format(format!(
                    "header of {used} bytes exceeds {header_bytes}-byte slot"
                )));
            }
            skip_padding(&mut self.reader, header_bytes - used)?;
            header.set_header_size(header_bytes);
        }

        let descriptor = BlockDescriptor::from_header(&header)?;
        self.session.check(&descriptor)?;
        let geometry = BlockGeometry::resolve(&descriptor)?;

        read_data_region(&mut self.reader, descriptor.blocsize, &mut self.scratch)?;

        let pad = match self.layout {
            BlockLayout::Stream if descriptor.directio => data_padding(descriptor.blocsize),
            BlockLayout::Stream => 0,
            BlockLayout::FixedSlots { data_bytes, .. } => {
                if descriptor.blocsize > data_bytes {
                    return Err(GuppiError::geometry(format!(
                        "BLOCSIZE {} exceeds {data_bytes}-byte data slot",
                        descriptor.blocsize
                    )));
                }
                data_bytes - descriptor.blocsize
            }
        };
        trace!("skipping {pad} bytes after data region");
        let skipped = skip_padding(&mut self.reader, pad)?;

        self.stats.blocks_read += 1;
        self.stats.bytes_processed += (header.header_size() + descriptor.blocsize + skipped) as u64;

        Ok(Some((header, descriptor, geometry)))
    }
}

impl<R: Read + Seek> GuppiReader<R> {
    /// Читает первый заголовок, фиксирует сессию и возвращается в начало.
    ///
    /// Пустой поток допустим: сессия останется пустой.
    pub fn probe(inner: R) -> GuppiResult<Self> {
        Self::probe_with_layout(inner, BlockLayout::Stream)
    }

    pub fn probe_with_layout(
        inner: R,
        layout: BlockLayout,
    ) -> GuppiResult<Self> {
        let mut reader = Self::with_layout(inner, layout);

        if let Some(header) = GuppiHeader::parse_from(&mut reader.reader)? {
            let descriptor = BlockDescriptor::from_header(&header)?;
            BlockGeometry::resolve(&descriptor)?;
            reader.session.check(&descriptor)?;
        }

        reader.reader.seek(SeekFrom::Start(0))?;
        Ok(reader)
    }

    /// Возвращается к началу потока. Состояние сессии сохраняется.
    pub fn rewind(&mut self) -> GuppiResult<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.failed = false;
        self.stats = ReadStats::default();
        Ok(())
    }
}

impl GuppiReader<File> {
    /// Открывает файл и сразу проверяет первый заголовок.
    pub fn open<P: AsRef<Path>>(path: P) -> GuppiResult<Self> {
        Self::probe(File::open(path)?)
    }
}

impl<R: Read> Iterator for GuppiReader<R> {
    type Item = GuppiResult<GuppiBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block()
    }
}

impl<W: Write> GuppiWriter<W> {
    /// Создаёт писатель, упаковывающий выборки в `bit_depth`.
    pub fn new(
        inner: W,
        bit_depth: BitDepth,
    ) -> Self {
        Self {
            writer: BufWriter::new(inner),
            bit_depth,
            block_count: 0,
            bytes_written: 0,
        }
    }

    /// Записывает блок из тензора.
    ///
    /// Поля раскладки (OBSNCHAN, NANTS/NBEAMS, NCHAN, NPOL, PIPERBLK,
    /// BLOCSIZE, NBITS) выводятся из формы тензора; значения из `header`
    /// для них игнорируются, кроме уже заданного PIPERBLK. Возвращает
    /// фактически записанный заголовок.
    pub fn write_block(
        &mut self,
        header: &GuppiHeader,
        tensor: &SampleTensor,
    ) -> GuppiResult<GuppiHeader> {
        let mut data = Vec::with_capacity(self.bit_depth.packed_len(tensor.len()));
        self.bit_depth.encode(tensor.view().iter(), &mut data);

        let mut header = header.clone();
        apply_tensor_layout(&mut header, tensor, data.len())?;

        self.write_raw_block(&header, &data)?;
        Ok(header)
    }

    /// Записывает заранее упакованные данные. BLOCSIZE в заголовке обязан
    /// совпадать с длиной `data`.
    pub fn write_raw_block(
        &mut self,
        header: &GuppiHeader,
        data: &[u8],
    ) -> GuppiResult<()> {
        let blocsize = header.get_usize(keys::BLOCSIZE)?;
        if blocsize != data.len() {
            return Err(GuppiError::shape(format!(
                "BLOCSIZE {blocsize} does not match {} data bytes",
                data.len()
            )));
        }

        let header_bytes = header.serialize()?;
        self.writer.write_all(&header_bytes)?;
        self.writer.write_all(data)?;

        let pad = if header.directio() {
            data_padding(data.len())
        } else {
            0
        };
        write_padding(&mut self.writer, pad, DATA_PAD_FILL)?;

        self.block_count += 1;
        self.bytes_written += (header_bytes.len() + data.len() + pad) as u64;
        debug!(
            "wrote block {}: {} header bytes, {} data bytes",
            self.block_count - 1,
            header_bytes.len(),
            data.len()
        );

        Ok(())
    }

    /// Сбрасывает буфер и возвращает внутренний поток.
    pub fn finish(mut self) -> GuppiResult<W> {
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| GuppiError::Io(e.into_error()))
    }

    /// Количество записанных блоков.
    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    /// Всего записано байт, включая выравнивание.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }
}

/// Проставляет в заголовке поля раскладки, выведенные из формы тензора.
pub fn apply_tensor_layout(
    header: &mut GuppiHeader,
    tensor: &SampleTensor,
    blocsize: usize,
) -> GuppiResult<()> {
    if tensor.is_empty() {
        return Err(GuppiError::shape(format!(
            "cannot write an empty tensor of shape {:?}",
            tensor.shape()
        )));
    }

    match tensor.group_count() {
        Some(groups) if header.contains_key(keys::NBEAMS) => {
            header.remove(keys::NANTS);
            header.insert(keys::NBEAMS, groups);
        }
        Some(groups) => {
            header.insert(keys::NANTS, groups);
        }
        None => {
            header.remove(keys::NANTS);
            header.remove(keys::NBEAMS);
        }
    }

    header.insert(keys::OBSNCHAN, tensor.obsnchan());
    header.insert(keys::NCHAN, tensor.nchan_per_group());
    header.insert(keys::NPOL, tensor.npol());
    header.insert_default(keys::PIPERBLK, tensor.ntime());
    header.insert(keys::BLOCSIZE, blocsize);
    header.insert(keys::NBITS, blocsize * 8 / (tensor.len() * 2));
    header.insert_default(keys::DIRECTIO, 0);

    Ok(())
}

/// Записывает один блок в файл: дописывает в конец при `append`, иначе
/// создаёт/обрезает файл.
pub fn write_block_to_path<P: AsRef<Path>>(
    path: P,
    header: &GuppiHeader,
    tensor: &SampleTensor,
    bit_depth: BitDepth,
    append: bool,
) -> GuppiResult<GuppiHeader> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    let mut writer = GuppiWriter::new(file, bit_depth);
    let written = writer.write_block(header, tensor)?;
    writer.finish()?;

    Ok(written)
}

/// Convenience: читает все блоки потока.
pub fn read_all_blocks<R: Read>(reader: &mut GuppiReader<R>) -> GuppiResult<Vec<GuppiBlock>> {
    reader.by_ref().collect()
}
