use std::path::{Component, Path};

use actix_files::NamedFile;
use actix_web::error::ErrorNotFound;
use actix_web::web;

use crate::config::Config;

// 静态资源，只允许访问资源目录下的单个文件
pub(crate) async fn resources(
    path: web::Path<String>,
    config: web::Data<Config>,
) -> actix_web::Result<NamedFile> {
    let filename = path.into_inner();
    let mut components = Path::new(&filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => {
            Ok(NamedFile::open(config.server.resources_dir.join(name))?)
        }
        _ => Err(ErrorNotFound("no such resource")),
    }
}
