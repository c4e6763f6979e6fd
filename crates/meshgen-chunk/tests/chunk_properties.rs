//! End-to-end properties of the describe/fill protocol.

use meshgen_chunk::{
    BiasParameters, ChunkError, ChunkGenerator, ColorGradient, DVec3, ErrorKind, HeightField,
    NoiseParameters, Rgba8, TerrainVertex,
};

struct Buffers {
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    texels: Vec<Rgba8>,
}

fn allocate(generator: &mut ChunkGenerator) -> Buffers {
    let desc = generator.describe_geometry().unwrap();
    let (w, h) = generator.describe_texture();
    Buffers {
        vertices: vec![TerrainVertex::default(); desc.vertex_count],
        indices: vec![0; desc.face_count * 3],
        texels: vec![Rgba8::default(); w as usize * h as usize],
    }
}

fn fill(generator: &mut ChunkGenerator, offset: DVec3) -> Buffers {
    let mut b = allocate(generator);
    generator
        .fill(&mut b.vertices, &mut b.indices, &mut b.texels, offset)
        .unwrap();
    b
}

fn seeded(side_length: u32, seed: u32) -> ChunkGenerator {
    let mut generator = ChunkGenerator::create(side_length, 30.0).unwrap();
    generator
        .set_noise(
            NoiseParameters {
                seed,
                octaves: 5,
                scale: 20.0,
                ..Default::default()
            },
            BiasParameters::default(),
        )
        .unwrap();
    generator
}

#[test]
fn test_fill_is_deterministic_across_sessions() {
    let offset = DVec3::new(-40.0, 0.0, 17.0);
    let a = fill(&mut seeded(16, 1234), offset);
    let b = fill(&mut seeded(16, 1234), offset);

    assert_eq!(vertex_bits(&a.vertices), vertex_bits(&b.vertices));
    assert_eq!(a.indices, b.indices);
    assert_eq!(a.texels, b.texels);
}

fn vertex_bits(v: &[TerrainVertex]) -> Vec<u32> {
    v.iter()
        .flat_map(|vert| {
            vert.position
                .iter()
                .chain(&vert.normal)
                .chain(&vert.tangent)
                .chain(&vert.uv)
                .map(|f| f.to_bits())
                .collect::<Vec<u32>>()
        })
        .collect()
}

#[test]
fn test_repeated_fill_is_idempotent() {
    let mut generator = seeded(8, 3);
    let mut b = allocate(&mut generator);
    let offset = DVec3::new(5.0, 0.0, 5.0);
    generator
        .fill(&mut b.vertices, &mut b.indices, &mut b.texels, offset)
        .unwrap();
    let first = (b.vertices.clone(), b.indices.clone(), b.texels.clone());
    generator
        .fill(&mut b.vertices, &mut b.indices, &mut b.texels, offset)
        .unwrap();
    assert_eq!(first, (b.vertices, b.indices, b.texels));
}

#[test]
fn test_geometry_counts_and_index_validity() {
    for n in 1..=20 {
        let mut generator = seeded(n, 9);
        let desc = generator.describe_geometry().unwrap();
        let n = n as usize;
        assert_eq!(desc.vertex_count, (n + 1) * (n + 1));
        assert_eq!(desc.face_count * 3, n * n * 6);

        let b = fill(&mut generator, DVec3::ZERO);
        let count = desc.vertex_count as u32;
        assert!(b.indices.iter().all(|&i| i < count), "bad index for N={n}");
    }
}

#[test]
fn test_gradient_boundaries() {
    let gradient = ColorGradient::terrain();
    let keys = gradient.keys();
    assert_eq!(gradient.sample(0.0), keys[0].color);
    assert_eq!(gradient.sample(1.0), keys[keys.len() - 1].color);

    let mid = ColorGradient::grayscale().sample(0.5);
    assert!((i32::from(mid.r) - 128).abs() <= 1);
}

#[test]
fn test_adjacent_chunks_share_edge_heights() {
    let n = 12;
    let mut generator = seeded(n, 77);
    let left = fill(&mut generator, DVec3::ZERO);
    let right = fill(&mut generator, DVec3::new(f64::from(n), 0.0, 0.0));

    let row = n as usize + 1;
    for j in 0..row {
        let l = left.vertices[j * row + (row - 1)];
        let r = right.vertices[j * row];
        assert_eq!(l.position[1], r.position[1], "edge height mismatch at row {j}");
        assert_eq!(l.position[2], r.position[2]);
    }
}

#[test]
fn test_height_continuous_under_small_offset() {
    let mut generator = seeded(4, 5);
    let desc_offset = DVec3::new(100.0, 0.0, -50.0);
    fill(&mut generator, desc_offset);
    let base = generator.sampler().height(0.0, 0.0);

    for step in [1e-3, 1e-2, 1e-1] {
        fill(&mut generator, desc_offset + DVec3::new(step, 0.0, step));
        let moved = generator.sampler().height(0.0, 0.0);
        // 30 world units of height across 20-unit noise features, 5 octaves.
        assert!(
            (moved - base).abs() < 200.0 * step,
            "height jumped {} for offset step {step}",
            (moved - base).abs()
        );
    }
}

#[test]
fn test_undersized_vertex_buffer_is_not_written() {
    let mut generator = seeded(4, 1);
    let desc = generator.describe_geometry().unwrap();
    let (w, h) = generator.describe_texture();

    let sentinel = TerrainVertex {
        position: [-9.0; 3],
        ..Default::default()
    };
    let mut vertices = vec![sentinel; desc.vertex_count - 1];
    let mut indices = vec![u32::MAX; desc.face_count * 3];
    let mut texels = vec![Rgba8::new(1, 2, 3, 4); (w * h) as usize];

    let err = generator
        .fill(&mut vertices, &mut indices, &mut texels, DVec3::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Contract);
    assert!(matches!(err, ChunkError::Mesh(_)));
    assert!(vertices.iter().all(|v| *v == sentinel));
    assert!(indices.iter().all(|&i| i == u32::MAX));
    assert!(texels.iter().all(|&t| t == Rgba8::new(1, 2, 3, 4)));
}

#[test]
fn test_oversized_index_buffer_rejected() {
    let mut generator = seeded(3, 1);
    let mut b = allocate(&mut generator);
    b.indices.push(0);
    let err = generator
        .fill(&mut b.vertices, &mut b.indices, &mut b.texels, DVec3::ZERO)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Contract);
}

#[test]
fn test_flat_two_by_two_chunk() {
    let mut generator = ChunkGenerator::create(2, 50.0).unwrap();
    generator
        .set_noise(NoiseParameters::flat(), BiasParameters::default())
        .unwrap();
    let b = fill(&mut generator, DVec3::new(123.0, 4.0, -77.0));

    assert_eq!(b.vertices.len(), 9);
    assert_eq!(b.indices.len(), 24);
    for v in &b.vertices {
        assert_eq!(v.position[1], 4.0);
        assert_eq!(v.normal, [0.0, 1.0, 0.0]);
    }
    let xs: Vec<f32> = b.vertices.iter().map(|v| v.position[0]).collect();
    assert_eq!(xs, vec![-1.0, 0.0, 1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 1.0]);
}

#[test]
fn test_zero_octaves_is_flat_too() {
    let mut generator = ChunkGenerator::create(2, 50.0).unwrap();
    generator
        .set_noise(
            NoiseParameters {
                octaves: 0,
                ..Default::default()
            },
            BiasParameters::default(),
        )
        .unwrap();
    let b = fill(&mut generator, DVec3::ZERO);
    assert!(b.vertices.iter().all(|v| v.position[1] == 0.0));
}

#[test]
fn test_texture_rows_match_mesh_orientation() {
    let n = 8;
    let mut generator = seeded(n, 41);
    generator.set_gradient(ColorGradient::grayscale());
    generator.set_texture_size(n, n).unwrap();
    let b = fill(&mut generator, DVec3::ZERO);

    // Texel (x, y) centers sit at (x + 0.5 - N/2, y + 0.5 - N/2).
    let half = f64::from(n) / 2.0;
    for y in 0..n {
        for x in 0..n {
            let wx = f64::from(x) + 0.5 - half;
            let wz = f64::from(y) + 0.5 - half;
            let expected = ColorGradient::grayscale().sample(generator.sampler().normalized(wx, wz));
            assert_eq!(b.texels[(y * n + x) as usize], expected);
        }
    }
}

#[test]
fn test_independent_sessions_run_in_parallel() {
    let results: Vec<Vec<u32>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4u32)
            .map(|k| {
                scope.spawn(move || {
                    let mut generator = seeded(6, 10);
                    let b = fill(&mut generator, DVec3::new(f64::from(k) * 6.0, 0.0, 0.0));
                    b.vertices
                        .iter()
                        .map(|v| v.position[1].to_bits())
                        .collect::<Vec<u32>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut serial = seeded(6, 10);
    for (k, heights) in results.iter().enumerate() {
        let b = fill(&mut serial, DVec3::new(k as f64 * 6.0, 0.0, 0.0));
        let expected: Vec<u32> = b.vertices.iter().map(|v| v.position[1].to_bits()).collect();
        assert_eq!(heights, &expected);
    }
}
