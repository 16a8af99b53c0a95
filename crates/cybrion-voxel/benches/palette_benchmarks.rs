use criterion::{Criterion, black_box, criterion_group, criterion_main};
use cybrion_voxel::{BitPackedArray, BlockStateId, CHUNK_SIZE, CHUNK_VOLUME, ChunkData, GridChunk};
use glam::{IVec3, UVec3};

fn striped_chunk(distinct: u32) -> GridChunk {
    let mut chunk: GridChunk = ChunkData::new(IVec3::ZERO, distinct, BlockStateId(0)).unwrap();
    for slot in 0..CHUNK_VOLUME {
        let pos = UVec3::new(
            (slot % CHUNK_SIZE) as u32,
            ((slot / CHUNK_SIZE) % CHUNK_SIZE) as u32,
            (slot / (CHUNK_SIZE * CHUNK_SIZE)) as u32,
        );
        chunk
            .set_state(pos, BlockStateId(slot as u32 % distinct))
            .unwrap();
    }
    chunk
}

fn bench_get_sweep(c: &mut Criterion) {
    let chunk = striped_chunk(12);
    c.bench_function("chunk_get_sweep_4bit", |bencher| {
        bencher.iter(|| {
            let mut acc = 0u32;
            for z in 0..CHUNK_SIZE as u32 {
                for y in 0..CHUNK_SIZE as u32 {
                    for x in 0..CHUNK_SIZE as u32 {
                        acc = acc.wrapping_add(chunk.get_state(UVec3::new(x, y, z)).0);
                    }
                }
            }
            black_box(acc)
        })
    });
}

fn bench_set_existing(c: &mut Criterion) {
    let mut chunk = striped_chunk(12);
    let pos = black_box(UVec3::new(17, 9, 30));
    c.bench_function("chunk_set_existing_state", |bencher| {
        bencher.iter(|| chunk.set_state(pos, black_box(BlockStateId(5))))
    });
}

fn bench_fill_from_empty(c: &mut Criterion) {
    c.bench_function("chunk_fill_300_states", |bencher| {
        bencher.iter(|| black_box(striped_chunk(300)))
    });
}

fn bench_resize_width(c: &mut Criterion) {
    let mut packed = BitPackedArray::new(5, CHUNK_VOLUME);
    for slot in 0..CHUNK_VOLUME {
        packed.set(slot, (slot % 32) as u32);
    }
    c.bench_function("bit_packed_resize_5_to_6", |bencher| {
        bencher.iter(|| {
            let mut copy = packed.clone();
            copy.resize_width(6);
            black_box(copy)
        })
    });
}

fn bench_compact(c: &mut Criterion) {
    let mut chunk = striped_chunk(40);
    for x in 0..CHUNK_SIZE as u32 {
        chunk.set_state(UVec3::new(x, 0, 0), BlockStateId(0)).unwrap();
    }
    c.bench_function("linear_palette_compacted", |bencher| {
        bencher.iter(|| black_box(chunk.blocks().compacted()))
    });
}

criterion_group!(
    benches,
    bench_get_sweep,
    bench_set_existing,
    bench_fill_from_empty,
    bench_resize_width,
    bench_compact,
);
criterion_main!(benches);
