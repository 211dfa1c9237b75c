use h1wire::{
    HeaderMap, Request, ResponseWriter, Server,
    http::StatusCode,
    response::{WriteError, chunked_headers, default_headers, replace_headers},
};
use std::io;
use tokio::net::TcpStream;

const DEFAULT_PORT: u16 = 42069;

const BAD_REQUEST: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>
";

const INTERNAL_SERVER_ERROR: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>
";

const SUCCESS: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>
";

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let port = match std::env::args().nth(1) {
        Some(port) => port.parse().map_err(io::Error::other)?,
        None => DEFAULT_PORT,
    };

    let server = Server::serve(port, handle).await?;
    log::info!("server started on port {port}");

    tokio::signal::ctrl_c().await?;
    server.close().await?;
    log::info!("server gracefully stopped");

    Ok(())
}

async fn handle(mut writer: ResponseWriter<TcpStream>, request: Request) -> Result<(), WriteError> {
    let target = request.target();

    if let Some(lines) = target.strip_prefix("/stream/") {
        return match lines.parse() {
            Ok(lines) => stream(&mut writer, lines).await,
            Err(_) => html(&mut writer, StatusCode::BAD_REQUEST, BAD_REQUEST).await,
        };
    }

    match target {
        "/yourproblem" => html(&mut writer, StatusCode::BAD_REQUEST, BAD_REQUEST).await,
        "/myproblem" => html(&mut writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR).await,
        _ => html(&mut writer, StatusCode::OK, SUCCESS).await,
    }
}

async fn html(
    writer: &mut ResponseWriter<TcpStream>,
    status: StatusCode,
    body: &str,
) -> Result<(), WriteError> {
    let mut headers = default_headers(body.len());
    replace_headers(&mut headers, &HeaderMap::from_iter([("Content-Type", "text/html")]));

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(body.as_bytes()).await?;
    Ok(())
}

/// Send `lines` numbered lines as one chunk each, then the total length as a trailer.
async fn stream(writer: &mut ResponseWriter<TcpStream>, lines: usize) -> Result<(), WriteError> {
    let mut headers = chunked_headers();
    headers.insert("Trailer", "X-Content-Length");

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut len = 0;
    for n in 0..lines {
        let line = format!("{n}: Your request was an absolute banger.\n");
        len += writer.write_chunked_body(line.as_bytes()).await?;
    }

    let mut trailers = HeaderMap::new();
    trailers.insert("X-Content-Length", len.to_string());
    writer.write_trailers(&trailers).await
}
