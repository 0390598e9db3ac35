use content::{
    resolve, Context, GenConfig, Generator, Registry, RegistryBuilder,
};
use glam::{ivec2, ivec3, IVec2};
use pretty_assertions::assert_eq;
use world::{
    FurnId, IdLookup, IdTable, Location, Spawn, SpawnKind, Submap, TerId,
    SUBMAP_SIZE,
};

fn load(json: &str) -> (Registry, IdTable) {
    let mut builder = RegistryBuilder::default();
    let report = builder.load_json("test", json).unwrap();
    assert!(report.failed.is_empty(), "{:?}", report.failed);
    let registry = builder.build();
    let names = registry.id_table();
    (registry, names)
}

fn ctx(seed: u64) -> Context {
    Context::new(Location::ZERO, seed)
}

/// Generate the first submap of a registered mapgen.
fn gen_one(registry: &Registry, names: &IdTable, id: &str, seed: u64) -> Submap {
    let mapgen = registry.get_mapgen_by_id(id).unwrap();
    let resolved = resolve(mapgen, registry);
    Generator::new(registry, names).generate(&resolved, &ctx(seed))
}

fn ter_name(names: &IdTable, s: &Submap, p: IVec2) -> String {
    names.terrain_name(s.ter(p)).to_owned()
}

#[test]
fn own_mapping_beats_palette() {
    let (registry, names) = load(
        r##"[
            {"type": "palette", "id": "house",
             "terrain": {".": "t_grass", "#": "t_wall"}},
            {"type": "mapgen", "om_terrain": "shed", "object": {
                "rows": [".#"],
                "palettes": ["house"],
                "terrain": {".": "t_floor"}
            }}
        ]"##,
    );
    let s = gen_one(&registry, &names, "shed", 1);
    assert_eq!(ter_name(&names, &s, ivec2(0, 0)), "t_floor");
    assert_eq!(ter_name(&names, &s, ivec2(1, 0)), "t_wall");
}

#[test]
fn earlier_palette_wins() {
    let (registry, names) = load(
        r#"[
            {"type": "palette", "id": "p1", "terrain": {".": "t_one"}},
            {"type": "palette", "id": "p2",
             "terrain": {".": "t_two", "x": "t_only_two"}},
            {"type": "mapgen", "om_terrain": "m", "object": {
                "rows": [".x"],
                "palettes": ["p1", "p2"]
            }}
        ]"#,
    );
    let s = gen_one(&registry, &names, "m", 1);
    assert_eq!(ter_name(&names, &s, ivec2(0, 0)), "t_one");
    assert_eq!(ter_name(&names, &s, ivec2(1, 0)), "t_only_two");
}

#[test]
fn weighted_terrain_proportions() {
    let (registry, names) = load(
        r#"[{"type": "mapgen", "nested_mapgen_id": "m", "object": {
            "rows": ["."],
            "terrain": {".": [["t_a", 70], ["t_b", 30]]}
        }}]"#,
    );
    let a = names.terrain_id("t_a");
    let b = names.terrain_id("t_b");

    let (mut a_count, mut b_count) = (0, 0);
    for seed in 0..10_000 {
        let t = gen_one(&registry, &names, "m", seed).ter(ivec2(0, 0));
        if t == a {
            a_count += 1;
        } else if t == b {
            b_count += 1;
        }
    }
    assert_eq!(a_count + b_count, 10_000);
    assert!((6700..7300).contains(&a_count), "{a_count}");
}

#[test]
fn small_mapgen_is_padded_with_fill() {
    let (registry, names) = load(
        r#######"[
            {"type": "mapgen", "om_terrain": "filled", "object": {
                "fill_ter": "t_grass",
                "rows": ["######", "######", "######",
                         "######", "######", "######"],
                "terrain": {"#": "t_wall"}
            }},
            {"type": "mapgen", "om_terrain": "bare", "object": {
                "rows": ["#"],
                "terrain": {"#": "t_wall"}
            }}
        ]"#######,
    );
    let wall = names.terrain_id("t_wall");
    let grass = names.terrain_id("t_grass");

    let s = gen_one(&registry, &names, "filled", 1);
    for y in 0..SUBMAP_SIZE {
        for x in 0..SUBMAP_SIZE {
            let expected = if x < 6 && y < 6 { wall } else { grass };
            assert_eq!(s.ter(ivec2(x, y)), expected, "at {x},{y}");
        }
    }

    let s = gen_one(&registry, &names, "bare", 1);
    assert_eq!(s.ter(ivec2(0, 0)), wall);
    assert_eq!(s.ter(ivec2(1, 0)), TerId::NULL);
    assert_eq!(s.ter(ivec2(11, 11)), TerId::NULL);
}

#[test]
fn split_grid_sizes() {
    let (registry, names) = load(
        r#"[
            {"type": "mapgen", "om_terrain": "square",
             "object": {"mapgensize": [24, 24], "fill_ter": "t_floor"}},
            {"type": "mapgen", "om_terrain": "tall",
             "object": {"mapgensize": [24, 48], "fill_ter": "t_floor"}}
        ]"#,
    );
    let generator = Generator::new(&registry, &names);
    let base = ivec3(120, -36, 1);

    let square = registry.get_mapgen_by_id("square").unwrap();
    let split = generator
        .generate_multiple(&resolve(square, &registry), &Context::new(base, 1));
    assert_eq!((split.grid_width, split.grid_height), (2, 2));
    assert_eq!(split.chunks.len(), 4);
    let last = split.get(ivec2(1, 1)).unwrap();
    assert_eq!(last.position, base + ivec3(12, 12, 0));

    let tall = registry.get_mapgen_by_id("tall").unwrap();
    let split = generator
        .generate_multiple(&resolve(tall, &registry), &Context::new(base, 1));
    assert_eq!((split.grid_width, split.grid_height), (2, 4));
    assert_eq!(split.chunks.len(), 8);
    assert!(split
        .chunks
        .iter()
        .all(|c| c.submap.uniform_terrain() == Some(names.terrain_id("t_floor"))));
}

#[test]
fn placement_lands_in_one_chunk() {
    let (registry, names) = load(
        r#"[{"type": "mapgen", "om_terrain": "m", "object": {
            "mapgensize": [24, 24],
            "fill_ter": "t_floor",
            "place_item": [{"item": "hammer", "x": 18, "y": 5}],
            "place_monster": [{"monster": "mon_cat", "x": 3, "y": 20}]
        }}]"#,
    );
    let m = registry.get_mapgen_by_id("m").unwrap();
    let split = Generator::new(&registry, &names)
        .generate_multiple(&resolve(m, &registry), &ctx(1));

    for chunk in &split.chunks {
        let s = &chunk.submap;
        let items: usize = (0..SUBMAP_SIZE)
            .flat_map(|y| (0..SUBMAP_SIZE).map(move |x| ivec2(x, y)))
            .map(|p| s.items(p).len())
            .sum();
        if chunk.grid == ivec2(1, 0) {
            assert_eq!(items, 1);
            assert_eq!(s.items(ivec2(6, 5))[0].id, "hammer");
        } else {
            assert_eq!(items, 0);
        }

        if chunk.grid == ivec2(0, 1) {
            assert_eq!(
                s.spawns,
                vec![Spawn::new(ivec2(3, 8), "mon_cat", SpawnKind::Monster)]
            );
        } else {
            assert!(s.spawns.is_empty());
        }
    }
}

#[test]
fn single_chunk_matches_split() {
    let (registry, names) = load(
        r#"[{"type": "mapgen", "om_terrain": "m", "object": {
            "rows": [
                "...........x.x..........",
                "..x.........x...........",
                "........................",
                ".....x.......x...x......",
                "........................",
                "........................",
                "...x.....x..........x...",
                "........................",
                "........................",
                "..............x.........",
                "........................",
                "........................",
                "........................",
                "..x.....................",
                "........................",
                "..........x.............",
                "........................",
                "........................",
                "...................x....",
                "........................",
                "........................",
                "......x.................",
                "........................",
                "........................"
            ],
            "terrain": {".": [["t_grass", 3], ["t_dirt", 1]], "x": "t_tree"},
            "items": {".": {"item": "trash", "chance": 5}},
            "place_monster": [
                {"monster": "mon_dog", "x": [0, 23], "y": [0, 23], "repeat": [2, 6]}
            ]
        }}]"#,
    );
    let m = registry.get_mapgen_by_id("m").unwrap();
    let resolved = resolve(m, &registry);
    let generator = Generator::new(&registry, &names);
    let ctx = ctx(9);

    let split = generator.generate_multiple(&resolved, &ctx);
    for grid in [ivec2(0, 0), ivec2(1, 0), ivec2(0, 1), ivec2(1, 1)] {
        let alone = generator.generate_chunk(&resolved, &ctx, grid);
        assert_eq!(alone, split.get(grid).unwrap().submap);
    }

    // Same inputs, same output.
    let again = generator.generate_multiple(&resolved, &ctx);
    for (a, b) in split.chunks.iter().zip(&again.chunks) {
        assert_eq!(a.submap, b.submap);
    }
}

#[test]
fn uniform_output_stays_uniform() {
    let (registry, names) = load(
        r#"[
            {"type": "mapgen", "om_terrain": "plain", "object": {
                "rows": ["....", "...."], "fill_ter": "t_grass",
                "terrain": {".": "t_grass"}
            }},
            {"type": "mapgen", "om_terrain": "chair", "object": {
                "rows": ["....", "..c."], "fill_ter": "t_grass",
                "terrain": {".": "t_grass"},
                "furniture": {"c": "f_chair"}
            }}
        ]"#,
    );
    let grass = names.terrain_id("t_grass");

    let s = gen_one(&registry, &names, "plain", 1);
    assert_eq!(s.uniform_terrain(), Some(grass));

    let s = gen_one(&registry, &names, "chair", 1);
    assert!(!s.is_uniform());
    assert_eq!(s.furn(ivec2(2, 1)), names.furniture_id("f_chair").unwrap());
    assert_eq!(s.ter(ivec2(2, 1)), grass);
    assert_eq!(s.ter(ivec2(11, 11)), grass);
    assert_eq!(s.furn(ivec2(0, 0)), FurnId::NULL);
}

#[test]
fn missing_nested_chunk_keeps_cell() {
    let (registry, names) = load(
        r#"[{"type": "mapgen", "om_terrain": "m", "object": {
            "rows": [".N"],
            "terrain": {".": "t_floor", "N": "t_carpet"},
            "nested": {"N": {"chunks": ["no_such_chunk"]}}
        }}]"#,
    );
    let m = registry.get_mapgen_by_id("m").unwrap();
    let (s, diag) = Generator::new(&registry, &names)
        .generate_reporting(&resolve(m, &registry), &ctx(1));
    assert_eq!(ter_name(&names, &s, ivec2(1, 0)), "t_carpet");
    assert!(diag.missing_chunks.contains("no_such_chunk"));
}

#[test]
fn nested_splice_and_sample() {
    let (registry, names) = load(
        r#"[
            {"type": "mapgen", "nested_mapgen_id": "desk", "object": {
                "mapgensize": [2, 2],
                "rows": ["dd", ".c"],
                "furniture": {"d": "f_desk", "c": "f_chair"}
            }},
            {"type": "mapgen", "om_terrain": "office", "object": {
                "fill_ter": "t_floor",
                "rows": ["D...", "....", "...S"],
                "nested": {
                    "D": {"chunks": [["desk", 1], ["null", 0]]},
                    "S": {"chunks": "desk", "x_delta": 1, "y_delta": 1}
                }
            }}
        ]"#,
    );
    let s = gen_one(&registry, &names, "office", 1);
    let desk = names.furniture_id("f_desk").unwrap();
    let chair = names.furniture_id("f_chair").unwrap();
    let floor = names.terrain_id("t_floor");

    // Whole 2x2 chunk spliced at the anchor.
    assert_eq!(s.furn(ivec2(0, 0)), desk);
    assert_eq!(s.furn(ivec2(1, 0)), desk);
    assert_eq!(s.furn(ivec2(0, 1)), FurnId::NULL);
    assert_eq!(s.furn(ivec2(1, 1)), chair);
    // The nested chunk has no terrain of its own.
    assert_eq!(s.ter(ivec2(0, 0)), floor);

    // Single sampled cell.
    assert_eq!(s.furn(ivec2(3, 2)), chair);
    assert_eq!(s.furn(ivec2(4, 2)), FurnId::NULL);
    assert_eq!(s.furn(ivec2(3, 3)), FurnId::NULL);
}

#[test]
fn nesting_depth_is_bounded() {
    let (registry, names) = load(
        r#"[
            {"type": "mapgen", "nested_mapgen_id": "loop", "object": {
                "rows": ["n"],
                "furniture": {"n": "f_box"},
                "nested": {"n": {"chunks": "loop"}}
            }},
            {"type": "mapgen", "om_terrain": "m", "object": {
                "rows": ["n"],
                "nested": {"n": {"chunks": "loop"}}
            }}
        ]"#,
    );
    let m = registry.get_mapgen_by_id("m").unwrap();
    let generator = Generator::new(&registry, &names).with_config(GenConfig {
        max_depth: 3,
        ..Default::default()
    });
    let (s, diag) = generator.generate_reporting(&resolve(m, &registry), &ctx(1));
    assert_eq!(diag.depth_limit_hits, 1);
    assert_eq!(s.furn(ivec2(0, 0)), names.furniture_id("f_box").unwrap());
}

#[test]
fn parameterized_palette_generation() {
    let (registry, names) = load(
        r#"[
            {"type": "palette", "id": "roof_flat", "terrain": {"^": "t_flat_roof"}},
            {"type": "palette", "id": "roof_tin", "terrain": {"^": "t_tin_roof"}},
            {"type": "mapgen", "om_terrain": "house", "object": {
                "rows": ["^"],
                "parameters": {
                    "roof": {"type": "palette_id",
                             "default": {"distribution": [["roof_flat", 1], ["roof_tin", 1]]}}
                },
                "palettes": [{"param": "roof"}]
            }}
        ]"#,
    );
    let generator = Generator::new(&registry, &names);

    let mut seen = util::HashSet::default();
    for seed in 0..40 {
        let (split, diag) = generator.generate_id("house", &ctx(seed)).unwrap();
        assert!(diag.missing_params.is_empty());
        seen.insert(ter_name(&names, &split.chunks[0].submap, ivec2(0, 0)));
    }
    assert_eq!(seen.len(), 2);

    let params = [("roof", "roof_tin")].into_iter().collect();
    let (split, _) = generator
        .generate_id("house", &ctx(0).with_params(params))
        .unwrap();
    assert_eq!(ter_name(&names, &split.chunks[0].submap, ivec2(0, 0)), "t_tin_roof");
}

#[test]
fn update_leaves_unmapped_cells_alone() {
    let (registry, names) = load(
        r#"[
            {"type": "mapgen", "update_mapgen_id": "burn", "object": {
                "rows": ["x.", ".x"],
                "terrain": {"x": "t_ash"},
                "fields": {"x": {"field": "fd_fire", "intensity": 2}}
            }},
            {"type": "mapgen", "om_terrain": "yard", "object": {
                "fill_ter": "t_grass", "rows": ["c"], "furniture": {"c": "f_bench"}
            }}
        ]"#,
    );
    let generator = Generator::new(&registry, &names);
    let yard = gen_one(&registry, &names, "yard", 1);

    let burn = registry.get_mapgen_by_id("burn").unwrap();
    let burnt = generator.update(&resolve(burn, &registry), &ctx(1), &yard);

    let ash = names.terrain_id("t_ash");
    let grass = names.terrain_id("t_grass");
    assert_eq!(burnt.ter(ivec2(0, 0)), ash);
    assert_eq!(burnt.ter(ivec2(1, 1)), ash);
    assert_eq!(burnt.ter(ivec2(1, 0)), grass);
    assert_eq!(burnt.ter(ivec2(5, 5)), grass);
    assert_eq!(burnt.furn(ivec2(0, 0)), names.furniture_id("f_bench").unwrap());
    assert_eq!(burnt.field_count(), 2);

    // The input is untouched.
    assert_eq!(yard.ter(ivec2(0, 0)), grass);
    assert_eq!(yard.field_count(), 0);
}

#[test]
fn unknown_names_degrade() {
    let (registry, _) = load(
        r#"[{"type": "mapgen", "om_terrain": "m", "object": {
            "rows": [".c?"],
            "terrain": {".": "t_floor"},
            "furniture": {"c": "f_chair"},
            "palettes": ["gone"]
        }}]"#,
    );
    // Lookup that knows nothing.
    let names = IdTable::default();
    let m = registry.get_mapgen_by_id("m").unwrap();
    let (s, diag) = Generator::new(&registry, &names)
        .generate_reporting(&resolve(m, &registry), &ctx(1));

    assert_eq!(s.ter(ivec2(0, 0)), TerId::NULL);
    assert_eq!(s.furn(ivec2(1, 0)), FurnId::NULL);
    assert!(diag.unknown_terrain.contains("t_floor"));
    assert!(diag.unknown_furniture.contains("f_chair"));
    assert!(diag.unmapped_symbols.contains(&'?'));
    assert!(diag.missing_palettes.contains("gone"));
    assert!(!diag.is_clean());
}

#[test]
fn oversized_mapgen_is_rejected_at_load() {
    let mut builder = RegistryBuilder::default();
    let report = builder
        .load_json(
            "test",
            r#"[
                {"type": "mapgen", "om_terrain": "huge",
                 "object": {"mapgensize": [2147483647, 1], "fill_ter": "t_floor"}},
                {"type": "mapgen", "om_terrain": "fine",
                 "object": {"mapgensize": [24, 24], "fill_ter": "t_floor"}}
            ]"#,
        )
        .unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "test[0] huge");

    let registry = builder.build();
    let names = registry.id_table();
    assert!(registry.get_mapgen_by_id("huge").is_none());
    let (split, _) = Generator::new(&registry, &names)
        .generate_id("fine", &ctx(1))
        .unwrap();
    assert_eq!(split.chunks.len(), 4);
}
