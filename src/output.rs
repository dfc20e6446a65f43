use crate::models::Movie;

pub fn print_movies(movies: &[Movie], empty_message: &str) {
    if movies.is_empty() {
        println!("{empty_message}");
        return;
    }
    for movie in movies {
        print_movie(movie);
    }
}

pub fn print_movie(movie: &Movie) {
    println!("{}", movie_line(movie));
}

fn movie_line(movie: &Movie) -> String {
    let status = if movie.watched { "watched" } else { "pending" };
    let rating = match movie.rating {
        Some(rating) => format!("  {rating}/10"),
        None => String::new(),
    };
    format!(
        "{}  {} ({}) [{}] {}{}  added {}",
        movie.id,
        movie.title,
        movie.year,
        movie.genre,
        status,
        rating,
        movie.created_at.strftime("%Y-%m-%d"),
    )
}
