//! Output for a filled grid: plain text for the terminal, or a PNG image with one square per cell.

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgba, RgbaImage};
use log::debug;

use crate::consistency::Assignment;
use crate::error::Result;
use crate::grid_config::GridConfig;
use crate::word_list::WordList;

/// Character used for blocked cells.
pub const BLOCK: char = '█';

/// Side of one cell in a rendered image, in pixels.
pub const CELL_SIZE: u32 = 100;

/// Width of the dark edge left around each open cell.
pub const CELL_BORDER: u32 = 2;

/// Each pixel of an 8x8 font glyph is drawn as a square this many pixels wide.
const GLYPH_SCALE: u32 = 8;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// The letter in each cell, `None` where no assigned slot covers it. Indexed as `[y][x]`.
fn letter_grid(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
) -> Vec<Vec<Option<char>>> {
    let mut letters = vec![vec![None; config.width]; config.height];

    for (slot_id, word_id) in assignment.iter() {
        let slot_config = &config.slot_configs[slot_id];
        let word = word_list.word(word_id);

        for (&(x, y), &glyph) in slot_config.cell_coords().iter().zip(&word.glyphs) {
            letters[y][x] = Some(word_list.glyphs[glyph]);
        }
    }

    letters
}

/// Turn the given grid config and assignment into a rendered string, one line per row. Open cells
/// that no assigned slot covers are left blank.
pub fn render_grid(config: &GridConfig, word_list: &WordList, assignment: &Assignment) -> String {
    letter_grid(config, word_list, assignment)
        .into_iter()
        .enumerate()
        .map(|(y, row)| {
            row.into_iter()
                .enumerate()
                .map(|(x, letter)| match letter {
                    Some(letter) => letter,
                    None if config.is_open(x, y) => ' ',
                    None => BLOCK,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fill_square(image: &mut RgbaImage, left: u32, top: u32, size: u32, color: Rgba<u8>) {
    for y in top..top + size {
        for x in left..left + size {
            image.put_pixel(x, y, color);
        }
    }
}

/// Draw the grid as an image: a black canvas with a white square for every open cell and each
/// assigned letter centered in black. Letters outside the basic ASCII font are left out.
pub fn render_image(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
) -> RgbaImage {
    let interior = CELL_SIZE - 2 * CELL_BORDER;
    let glyph_offset = (interior - 8 * GLYPH_SCALE) / 2;

    let mut image = RgbaImage::from_pixel(
        config.width as u32 * CELL_SIZE,
        config.height as u32 * CELL_SIZE,
        BLACK,
    );

    for (y, row) in letter_grid(config, word_list, assignment).into_iter().enumerate() {
        for (x, letter) in row.into_iter().enumerate() {
            if !config.is_open(x, y) {
                continue;
            }

            let left = x as u32 * CELL_SIZE + CELL_BORDER;
            let top = y as u32 * CELL_SIZE + CELL_BORDER;
            fill_square(&mut image, left, top, interior, WHITE);

            let glyph = match letter.and_then(|letter| BASIC_FONTS.get(letter)) {
                Some(glyph) => glyph,
                None => continue,
            };

            // Bit 0 of each row byte is the leftmost pixel.
            for (glyph_y, bits) in glyph.iter().enumerate() {
                for glyph_x in 0..8 {
                    if bits & (1u8 << glyph_x) != 0 {
                        fill_square(
                            &mut image,
                            left + glyph_offset + glyph_x * GLYPH_SCALE,
                            top + glyph_offset + glyph_y as u32 * GLYPH_SCALE,
                            GLYPH_SCALE,
                            BLACK,
                        );
                    }
                }
            }
        }
    }

    image
}

/// Render the grid with [`render_image`] and write it to `path`. The format follows the file
/// extension.
pub fn save_image<P: AsRef<Path>>(
    config: &GridConfig,
    word_list: &WordList,
    assignment: &Assignment,
    path: P,
) -> Result<()> {
    let image = render_image(config, word_list, assignment);
    image.save(path.as_ref())?;
    debug!("saved {}x{} image to {}", image.width(), image.height(), path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use crate::arc_consistency::tests::crossing_grid;
    use crate::consistency::Assignment;
    use crate::render::{render_grid, render_image, save_image, CELL_BORDER, CELL_SIZE};
    use crate::word_list::WordList;

    const BLACK: [u8; 4] = [0, 0, 0, 255];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_render_complete_grid() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["car", "art"]);
        let assignment = Assignment::new()
            .with(0, word_list.find("car").unwrap())
            .with(1, word_list.find("art").unwrap());

        assert_eq!(render_grid(&grid_config, &word_list, &assignment), "██A\nCAR\n██T");
    }

    #[test]
    fn test_render_partial_grid() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["art"]);
        let assignment = Assignment::new().with(1, word_list.find("art").unwrap());

        assert_eq!(render_grid(&grid_config, &word_list, &assignment), "██A\n  R\n██T");
        assert_eq!(
            render_grid(&grid_config, &word_list, &Assignment::new()),
            "██ \n   \n██ "
        );
    }

    #[test]
    fn test_render_image_paints_cells() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["art"]);
        let assignment = Assignment::new().with(1, word_list.find("art").unwrap());

        let image = render_image(&grid_config, &word_list, &assignment);
        assert_eq!(image.dimensions(), (3 * CELL_SIZE, 3 * CELL_SIZE));

        let center = CELL_SIZE / 2;
        // Blocked cell at the top left.
        assert_eq!(image.get_pixel(center, center).0, BLACK);
        // Open cell at the start of the across slot, which has no word yet.
        assert_eq!(image.get_pixel(center, CELL_SIZE + center).0, WHITE);
        // The edge between two open cells stays dark.
        assert_eq!(image.get_pixel(CELL_SIZE, CELL_SIZE + center).0, BLACK);
        assert_eq!(image.get_pixel(CELL_SIZE + CELL_BORDER, CELL_SIZE + center).0, WHITE);

        // The A at the top of the down slot leaves its corners white but puts ink in the middle.
        let (left, top) = (2 * CELL_SIZE + CELL_BORDER, CELL_BORDER);
        assert_eq!(image.get_pixel(left + 1, top + 1).0, WHITE);
        let inked = (left..left + CELL_SIZE - 2 * CELL_BORDER)
            .flat_map(|x| (top..top + CELL_SIZE - 2 * CELL_BORDER).map(move |y| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 == BLACK)
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_save_image_writes_png() {
        let grid_config = crossing_grid();
        let word_list = WordList::new(["car", "art"]);
        let assignment = Assignment::new()
            .with(0, word_list.find("car").unwrap())
            .with(1, word_list.find("art").unwrap());

        let path = env::temp_dir().join(format!("fillgrid-render-{}.png", std::process::id()));
        save_image(&grid_config, &word_list, &assignment, &path).unwrap();

        let saved = image::open(&path).unwrap().to_rgba8();
        fs::remove_file(&path).unwrap();
        assert_eq!(saved.dimensions(), (3 * CELL_SIZE, 3 * CELL_SIZE));
        assert_eq!(saved.get_pixel(CELL_SIZE / 2, CELL_SIZE / 2).0, BLACK);
    }
}
