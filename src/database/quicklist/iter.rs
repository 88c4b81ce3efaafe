use std::iter::FusedIterator;

use super::{
    quicklist_base::{BlockId, Position, Resolved},
    QuickList,
};

/// Итератор по элементам `QuickList` (разделяемая ссылка).
///
/// Поддерживает обход с обоих концов.
pub struct Iter<'a, T> {
    list: &'a QuickList<T>,
    /// Следующий элемент спереди: `(блок, смещение)`
    front: Option<(BlockId, usize)>,
    /// Граница сзади: `(блок, смещение за последним невыданным элементом)`
    back: Option<(BlockId, usize)>,
    remaining: usize,
}

/// Курсор для "живого" обхода списка.
///
/// Курсор не держит ссылку на список: он хранит дескриптор текущего блока,
/// его поколение и смещение, а топологию цепочки перечитывает на каждом
/// шаге. Поэтому между шагами список можно менять, и элементы, добавленные в
/// хвост до того, как курсор до него дошёл, будут выданы. Курсор, ещё не
/// сделавший ни одного шага, увидит и элементы, добавленные в голову.
///
/// Если блок под курсором слит с соседом, разделён или отвязан, курсор
/// переходит туда, куда переехали невыданные элементы. После `clear` обход
/// начинается заново с головы. Вставки и удаления внутри блока тоже
/// учитываются: курсор остаётся перед тем же невыданным элементом.
///
/// Список помнит ограниченное число последних перемещений. Курсор, который
/// отстал сильнее, теряет место: [`Cursor::next`] возвращает `None`, а
/// [`Cursor::is_lost`] возвращает `true` до вызова [`Cursor::reset`].
///
/// ```
/// use quicklist::QuickList;
///
/// let mut list = QuickList::new(4);
/// list.extend(0..3);
///
/// let mut cursor = list.cursor();
/// let mut seen = Vec::new();
/// while let Some(&value) = cursor.next(&list) {
///     if value < 5 {
///         list.push(value + 3);
///     }
///     seen.push(value);
/// }
///
/// assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6, 7]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Следующий невыданный элемент, `None` до первого шага
    position: Option<Position>,
    lost: bool,
}

/// Владеющий итератор: забирает элементы из головы списка.
pub struct IntoIter<T> {
    list: QuickList<T>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(list: &'a QuickList<T>) -> Self {
        Self {
            list,
            front: list.head.map(|id| (id, 0)),
            back: list.tail.map(|id| (id, list.nodes[id].block.len())),
            remaining: list.len(),
        }
    }
}

impl Cursor {
    /// Создаёт курсор, стоящий перед первым элементом.
    pub fn new() -> Self {
        Self {
            position: None,
            lost: false,
        }
    }

    /// Возвращает курсор в начало.
    pub fn reset(&mut self) {
        self.position = None;
        self.lost = false;
    }

    /// Курсор потерял место в списке и больше ничего не выдаст до
    /// [`Cursor::reset`].
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Выдаёт следующий элемент `list` или `None`, если курсор дошёл до
    /// текущего хвоста.
    ///
    /// После `None` курсор остаётся на хвосте: если в список потом добавят
    /// элементы, следующий вызов их выдаст.
    pub fn next<'a, T>(
        &mut self,
        list: &'a QuickList<T>,
    ) -> Option<&'a T> {
        if self.lost {
            return None;
        }

        let resolved = match self.position {
            Some(position) => list.resolve(position),
            None => Resolved::Restart,
        };
        let (mut id, mut offset) = match resolved {
            Resolved::At { id, offset } => (id, offset),
            Resolved::Restart => {
                self.position = None;
                (list.head?, 0)
            }
            Resolved::Lost => {
                self.lost = true;
                return None;
            }
        };

        loop {
            let node = list.nodes.get(id)?;
            let len = node.block.len();

            if offset < len {
                self.position = Some(list.position_at(id, offset + 1));
                return node.block.get(offset).ok();
            }

            match node.next {
                Some(next) => {
                    id = next;
                    offset = 0;
                }
                None => {
                    self.position = Some(list.position_at(id, len));
                    return None;
                }
            }
        }
    }
}

impl<T> IntoIter<T> {
    pub(crate) fn new(list: QuickList<T>) -> Self {
        Self { list }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Реализация трейтов для итераторов
////////////////////////////////////////////////////////////////////////////////

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let (mut id, mut offset) = self.front?;

        loop {
            let node = &list.nodes[id];

            if offset < node.block.len() {
                self.front = Some((id, offset + 1));
                self.remaining -= 1;
                return node.block.get(offset).ok();
            }

            id = node.next?;
            offset = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let (mut id, mut end) = self.back?;

        loop {
            let node = &list.nodes[id];

            if end > 0 {
                self.back = Some((id, end - 1));
                self.remaining -= 1;
                return node.block.get(end - 1).ok();
            }

            id = node.prev?;
            end = list.nodes[id].block.len();
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            list: self.list,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.shift().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop().ok()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
