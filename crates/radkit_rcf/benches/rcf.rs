use divan::AllocProfiler;

#[global_allocator]
static ALLOC: AllocProfiler = AllocProfiler::system();

fn main() {
    divan::main();
}

pub mod read {
    use binrw::BinWrite;
    use divan::Bencher;
    use radkit_rcf::{
        types::{RcfDirectoryEntry, RcfFilenameEntry, RcfHeader},
        RcfArchive,
    };
    use std::io::Cursor;

    fn get_input(count: u32) -> Vec<u8> {
        let dir_offset = RcfHeader::SIZE as u32;
        let dir_size = count * RcfDirectoryEntry::SIZE as u32;

        let mut names = Cursor::new(Vec::new());
        [0u32, 0].write_le(&mut names).unwrap();
        for i in 0..count {
            RcfFilenameEntry::new(format!("art\\set{}\\file{i}.p3d", i % 16), i)
                .write(&mut names)
                .unwrap();
        }
        let names = names.into_inner();

        let mut out = Cursor::new(Vec::new());
        RcfHeader {
            dir_offset,
            dir_size,
            filename_offset: dir_offset + dir_size,
            filename_size: names.len() as u32,
            record_count: count,
            ..Default::default()
        }
        .write(&mut out)
        .unwrap();
        for i in (0..count).rev() {
            RcfDirectoryEntry {
                hash: i,
                file_offset: i * 64,
                file_size: 64,
            }
            .write(&mut out)
            .unwrap();
        }

        let mut out = out.into_inner();
        out.extend_from_slice(&names);
        out
    }

    #[divan::bench(args = [16, 256, 4096])]
    fn open(bencher: Bencher, count: u32) {
        bencher
            .with_inputs(|| get_input(count))
            .bench_refs(|data| {
                divan::black_box(RcfArchive::from_bytes(data).unwrap());
            });
    }

    #[divan::bench]
    fn lookup_by_name(bencher: Bencher) {
        let rcf = RcfArchive::from_bytes(&get_input(4096)).unwrap();
        bencher.bench_local(move || {
            divan::black_box(rcf.by_name("art\\set7\\file2055.p3d").unwrap());
        });
    }
}
