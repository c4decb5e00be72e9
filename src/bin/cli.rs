use clap::Parser;
use levelgen::sweep::verify_seeds;
use levelgen::{Canvas, LevelConfig, LevelGenerator};
use std::path::PathBuf;

/// Генератор кольцевых уровней подземелья
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML (без него — настройки по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Сид генерации (по умолчанию: случайный)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Путь для сохранения отладочного рендера
    #[arg(long, default_value = "level.png")]
    png: PathBuf,

    /// Путь для сохранения снимка уровня в JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Пикселей на клетку в рендере
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Проверить N сидов подряд, начиная с --seed, вместо одной генерации
    #[arg(long, value_name = "N")]
    sweep: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let config = match &cli.config {
        Some(path) => LevelConfig::from_toml_file(path)?,
        None => LevelConfig::default(),
    };

    if let Some(count) = cli.sweep {
        let start = cli.seed.unwrap_or(0);
        let seeds: Vec<u64> = (start..start.saturating_add(count)).collect();
        println!("🧪 Проверка {} сидов начиная с {start}...", seeds.len());

        let reports = verify_seeds(&config, &seeds);
        let failed: Vec<_> = reports
            .iter()
            .filter(|r| !r.is_sound(config.max_num_of_edges))
            .collect();
        for report in &failed {
            println!("  ❌ {report:?}");
        }
        println!(
            "\nГотово! Исправных уровней: {}/{}",
            reports.len() - failed.len(),
            reports.len()
        );
        if !failed.is_empty() {
            return Err(format!("{} сидов не прошли проверку", failed.len()).into());
        }
        return Ok(());
    }

    let mut generator = LevelGenerator::new();
    if !generator.init(config.clone(), Canvas::new(cli.scale, config.tile_size), cli.seed) {
        return Err("генератор отклонил конфигурацию".into());
    }
    println!(
        "🏗️  Генерация уровня (сид: {}, комнат: {}, слоёв: {})...",
        generator.seed(),
        config.num_rooms,
        config.layers.len()
    );
    let ticks = generator.run_to_completion();

    let layout = generator.layout();
    println!(
        "Комнат: {}, коридоров: {}, шагов: {ticks}",
        layout.rooms.len(),
        layout.hallways.len()
    );
    if !layout.is_connected() {
        println!("⚠️  Уровень несвязен");
    }
    if generator.has_overlaps() {
        println!(
            "⚠️  Осталось пересечений комнат: {}",
            generator.overlapping_pairs()
        );
    }

    if let Some(path) = &cli.json {
        println!("Сохранение снимка в {}", path.display());
        layout.save_as_json(path)?;
    }

    if let Some(canvas) = generator.take_visuals() {
        println!("Сохранение рендера в {}", cli.png.display());
        canvas.save_as_png(&cli.png)?;
    }

    println!("\nГотово! Уровень сгенерирован.");
    Ok(())
}
