//! Image attachment helpers, usable inside or outside a transaction.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{FileOwner, ImageData, OwnerKind, ResultEngine, file_storage, to_data_uri};

/// Decode an optional `data:` URI before any write happens.
pub(super) fn parse_image(uri: Option<&str>) -> ResultEngine<Option<ImageData>> {
    uri.map(ImageData::from_data_uri).transpose()
}

/// Replace the image of `owner`.
pub(super) async fn put_image<C: ConnectionTrait>(
    conn: &C,
    owner: FileOwner,
    image: &ImageData,
) -> ResultEngine<()> {
    delete_image(conn, owner).await?;

    let filename = format!(
        "{}-{}-{}.{}",
        owner.kind.to_value(),
        owner.id,
        Uuid::new_v4().simple(),
        image.extension()
    );
    file_storage::ActiveModel {
        id: ActiveValue::NotSet,
        owner_kind: ActiveValue::Set(owner.kind),
        owner_id: ActiveValue::Set(owner.id),
        filename: ActiveValue::Set(filename),
        mime_type: ActiveValue::Set(image.mime_type.clone()),
        bytes: ActiveValue::Set(image.bytes.clone()),
        created_at: ActiveValue::Set(Utc::now()),
    }
    .insert(conn)
    .await?;
    Ok(())
}

pub(super) async fn delete_image<C: ConnectionTrait>(conn: &C, owner: FileOwner) -> ResultEngine<()> {
    file_storage::Entity::delete_many()
        .filter(file_storage::Column::OwnerKind.eq(owner.kind))
        .filter(file_storage::Column::OwnerId.eq(owner.id))
        .exec(conn)
        .await?;
    Ok(())
}

/// The image of `owner` as a `data:` URI.
pub(super) async fn image_for<C: ConnectionTrait>(
    conn: &C,
    owner: FileOwner,
) -> ResultEngine<Option<String>> {
    let file = file_storage::Entity::find()
        .filter(file_storage::Column::OwnerKind.eq(owner.kind))
        .filter(file_storage::Column::OwnerId.eq(owner.id))
        .one(conn)
        .await?;
    Ok(file.map(|file| to_data_uri(&file.mime_type, &file.bytes)))
}

/// Batch variant of [`image_for`], keyed by owner id.
pub(super) async fn images_for<C: ConnectionTrait>(
    conn: &C,
    kind: OwnerKind,
    ids: &[i32],
) -> ResultEngine<HashMap<i32, String>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let files = file_storage::Entity::find()
        .filter(file_storage::Column::OwnerKind.eq(kind))
        .filter(file_storage::Column::OwnerId.is_in(ids.to_vec()))
        .all(conn)
        .await?;
    Ok(files
        .into_iter()
        .map(|file| (file.owner_id, to_data_uri(&file.mime_type, &file.bytes)))
        .collect())
}
