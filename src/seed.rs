// src/seed.rs
//
// Fixed set of generated practice questions for the Python course.

use sqlx::SqlitePool;

use crate::{
    error::AppError,
    models::question::{Choice, ExamType, NewQuestion, Source},
    services::content,
};

/// Subject the generated questions are filed under.
pub const SEED_SUBJECT: &str = "بايثون";

/// How the seed subject's name looks after a lossy encoding round trip.
const MOJIBAKE_SUBJECT: &str = "??????";

pub struct SeedQuestion {
    pub text: &'static str,
    pub choices: [&'static str; 4],
    pub correct: Choice,
    pub explanation: &'static str,
}

pub const SEED_QUESTIONS: &[SeedQuestion] = &[
    SeedQuestion {
        text: "في بايثون، الثوابت الخاصة بالقوائم List تكون محاطة بـ:",
        choices: ["{}", "()", "[]", "<>"],
        correct: Choice::C,
        explanation: "Lists are surrounded by square brackets []",
    },
    SeedQuestion {
        text: "أي عبارة صحيحة عن Tuples؟",
        choices: ["يمكن تعديل عناصرها بعد الإنشاء", "غير مرتبة لكنها قابلة للتغيير", "لا يمكن تعديل عناصرها بعد الإنشاء", "تبدأ الفهارس من 1"],
        correct: Choice::C,
        explanation: "Tuples are immutable like strings",
    },
    SeedQuestion {
        text: "ناتج list(range(6)) هو:",
        choices: ["[1,2,3,4,5,6]", "[0,1,2,3,4,5]", "[0,1,2,3,4,5,6]", "[6]"],
        correct: Choice::B,
        explanation: "range(6) generates 0..5",
    },
    SeedQuestion {
        text: "ناتج list(range(6,10)) هو:",
        choices: ["[6,7,8,9]", "[6,7,8,9,10]", "[7,8,9,10]", "[6,10]"],
        correct: Choice::A,
        explanation: "range(6,10) returns 6..9",
    },
    SeedQuestion {
        text: "ناتج list(range(7,21,3)) هو:",
        choices: ["[7,10,13,16,19]", "[7,11,15,19]", "[7,10,13,16,19,22]", "[7,9,11,13,15,17,19]"],
        correct: Choice::A,
        explanation: "Step of 3 from 7 to <21",
    },
    SeedQuestion {
        text: "دالة len() في بايثون تعيد:",
        choices: ["قيمة آخر عنصر", "عدد العناصر", "أول عنصر", "نوع الكائن"],
        correct: Choice::B,
        explanation: "len returns number of items",
    },
    SeedQuestion {
        text: "إذا كان a=[1,2,3] و b=[4,5,6] فإن a+b يساوي:",
        choices: ["[1,2,3,4,5,6]", "[4,5,6,1,2,3]", "[1,2,3]", "خطأ"],
        correct: Choice::A,
        explanation: "List concatenation",
    },
    SeedQuestion {
        text: "الأمر t.sort() يقوم بـ:",
        choices: ["إرجاع نسخة مرتبة", "ترتيب القائمة تصاعديًا في مكانها", "ترتيب تنازلي فقط", "حذف العناصر"],
        correct: Choice::B,
        explanation: "sort sorts list in place",
    },
    SeedQuestion {
        text: "إذا كان t=[9,41,12,3,74,15] فإن t[1:3] يعيد:",
        choices: ["[9,41,12]", "[41,12]", "[12,3]", "[41,12,3]"],
        correct: Choice::B,
        explanation: "Slice 1:3",
    },
    SeedQuestion {
        text: "العبارة t[-1::-1] تعطي:",
        choices: ["نسخة مرتبة", "القائمة بالعكس", "أول عنصر فقط", "آخر عنصر فقط"],
        correct: Choice::B,
        explanation: "Reverse order slicing",
    },
    SeedQuestion {
        text: "نوع الكائن الناتج عن zip(year_list, pl_list) هو:",
        choices: ["list", "tuple", "zip", "dict"],
        correct: Choice::C,
        explanation: "type(x) is <class 'zip'>",
    },
    SeedQuestion {
        text: "وظيفة enumerate مع قائمة لغات تعطي:",
        choices: ["العناصر فقط", "الفهارس فقط", "أزواج (index, element)", "قيمة عشوائية"],
        correct: Choice::C,
        explanation: "enumerate returns index and item",
    },
    SeedQuestion {
        text: "أي وصف يطابق Set في بايثون؟",
        choices: ["مرتبة وقابلة للتكرار", "غير مرتبة وغير قابلة للتكرار", "مرتبة وقابلة للتغيير", "مفهرسة تبدأ من 1"],
        correct: Choice::B,
        explanation: "Sets are unordered and no duplicates",
    },
    SeedQuestion {
        text: "لإنشاء Set فارغة نستخدم:",
        choices: ["{}", "[]", "set()", "()"],
        correct: Choice::C,
        explanation: "empty set = set()",
    },
    SeedQuestion {
        text: "عملية الاتحاد بين مجموعتين يمكن كتابتها بـ:",
        choices: ["&", "|", "-", "%"],
        correct: Choice::B,
        explanation: "Union uses |",
    },
    SeedQuestion {
        text: "عملية التقاطع بين مجموعتين يمكن كتابتها بـ:",
        choices: ["|", "-", "&", "+"],
        correct: Choice::C,
        explanation: "Intersection uses &",
    },
    SeedQuestion {
        text: "عملية الفرق بين مجموعتين يمكن كتابتها بـ:",
        choices: ["-", "&", "|", "/"],
        correct: Choice::A,
        explanation: "Difference uses -",
    },
    SeedQuestion {
        text: "أي عبارة صحيحة عن remove و discard في set؟",
        choices: ["remove لا يحذف", "discard يسبب خطأ إذا لم يوجد عنصر", "remove يسبب خطأ إذا لم يوجد عنصر", "لا فرق بينهما"],
        correct: Choice::C,
        explanation: "remove raises error if not found; discard does not",
    },
    SeedQuestion {
        text: "القواميس Dictionaries هي:",
        choices: ["قوائم مرتبة", "مجموعة قيم بدون مفاتيح", "أزواج مفتاح/قيمة", "نصوص فقط"],
        correct: Choice::C,
        explanation: "Key/Value pairs",
    },
    SeedQuestion {
        text: "للتكرار على مفاتيح وقيم القاموس نستخدم:",
        choices: ["items()", "values() فقط", "keys() فقط", "zip()"],
        correct: Choice::A,
        explanation: "for key, value in dict.items()",
    },
    SeedQuestion {
        text: "في المثال: print('CS' in depts) حيث depts={'IT':101,'CIS':102,'MC':103} ستكون النتيجة:",
        choices: ["True", "False", "None", "Error"],
        correct: Choice::B,
        explanation: "CS not in depts",
    },
    SeedQuestion {
        text: "الدالة pop في القاموس:",
        choices: ["تحذف كل العناصر", "تعيد القيمة وتحذف المفتاح", "تضيف مفتاح", "ترتب القاموس"],
        correct: Choice::B,
        explanation: "pop returns value",
    },
    SeedQuestion {
        text: "رمز *args يُستخدم لـ:",
        choices: ["تمرير قاموس", "تمرير عدد غير معروف من الوسائط", "تعريف متغير ثابت", "استدعاء دالة"],
        correct: Choice::B,
        explanation: "Arbitrary arguments",
    },
    SeedQuestion {
        text: "رمز **kwargs يُستخدم لـ:",
        choices: ["تمرير عدد غير معروف من الوسائط المسماة", "تمرير قائمة", "تمرير tuple", "إغلاق برنامج"],
        correct: Choice::A,
        explanation: "Arbitrary keyword arguments",
    },
    SeedQuestion {
        text: "تعريف lambda في بايثون يكون:",
        choices: ["lambda arguments : expression", "lambda = arguments", "def lambda():", "lambda =>"],
        correct: Choice::A,
        explanation: "Lambda syntax",
    },
    SeedQuestion {
        text: "عند انتهاء عناصر الـ iterator يتم رفع:",
        choices: ["ValueError", "StopIteration", "TypeError", "IndexError"],
        correct: Choice::B,
        explanation: "StopIteration",
    },
    SeedQuestion {
        text: "الميزة الأساسية للـ generator هي استخدام:",
        choices: ["return", "yield", "break", "continue"],
        correct: Choice::B,
        explanation: "Generators use yield",
    },
    SeedQuestion {
        text: "الجملة assert x<=60 ستقوم بـ:",
        choices: ["طباعة x", "تتجاهل الشرط", "رفع خطأ إذا الشرط False", "تحويل x إلى int"],
        correct: Choice::C,
        explanation: "assert raises when false",
    },
    SeedQuestion {
        text: "تحويل 'Hello Bob' إلى int سينتج:",
        choices: ["0", "ValueError", "TypeError", "نجاح"],
        correct: Choice::B,
        explanation: "invalid literal for int",
    },
    SeedQuestion {
        text: "الفرق الأساسي بين re.match و re.search هو:",
        choices: ["لا فرق", "match يبحث في كل النص", "match يتحقق فقط من بداية النص", "search يتحقق فقط من البداية"],
        correct: Choice::C,
        explanation: "match at beginning",
    },
    SeedQuestion {
        text: "الـ Raw String يُكتب مثل:",
        choices: ["'pattern'", "r'pattern'", "u'pattern'", "b'pattern'"],
        correct: Choice::B,
        explanation: "r'...'",
    },
    SeedQuestion {
        text: "الرمز \\d في Regular Expressions يعني:",
        choices: ["أي حرف", "Digit 0-9", "Whitespace", "Not Digit"],
        correct: Choice::B,
        explanation: "digit",
    },
    SeedQuestion {
        text: "فتح ملف للقراءة الافتراضية يكون بالوضع:",
        choices: ["w", "a", "r", "x"],
        correct: Choice::C,
        explanation: "r read default",
    },
    SeedQuestion {
        text: "الوضع b في فتح الملفات يعني:",
        choices: ["Text mode", "Binary mode", "Backup", "Begin"],
        correct: Choice::B,
        explanation: "binary",
    },
    SeedQuestion {
        text: "الدالة __init__ في الكلاس تُسمّى:",
        choices: ["المدمر Destructor", "المنشئ Constructor", "المقارن", "المنسّق"],
        correct: Choice::B,
        explanation: "constructor",
    },
    SeedQuestion {
        text: "المتغيرات ذات الشرط __name في الكلاس تدل على:",
        choices: ["وراثة", "إخفاء بيانات", "فرز", "تكرار"],
        correct: Choice::B,
        explanation: "data hiding with double underscore",
    },
    SeedQuestion {
        text: "الدالة __str__ تُستخدم عند:",
        choices: ["عمليات الجمع", "الطباعة أو str()", "المقارنة", "الحذف"],
        correct: Choice::B,
        explanation: "print uses __str__",
    },
    SeedQuestion {
        text: "وراثة كلاس في بايثون تتم بكتابة:",
        choices: ["class A: B", "class B extends A", "class B(A):", "class B <- A"],
        correct: Choice::C,
        explanation: "class Manager(Employee)",
    },
    SeedQuestion {
        text: "في Tkinter، الدالة Tk() تقوم بـ:",
        choices: ["فتح ملف", "إنشاء نافذة رئيسية", "إنهاء التطبيق", "تشغيل thread"],
        correct: Choice::B,
        explanation: "Tk() creates main window",
    },
    SeedQuestion {
        text: "في زر Tkinter، الخاصية command تأخذ:",
        choices: ["استدعاء الدالة مباشرة", "اسم الدالة بدون أقواس", "نص زر", "عدد"],
        correct: Choice::B,
        explanation: "function name",
    },
    SeedQuestion {
        text: "لإدخال نص متعدد الأسطر في Tkinter نستخدم:",
        choices: ["Entry", "Label", "Text", "Button"],
        correct: Choice::C,
        explanation: "Text widget",
    },
];

/// 1-based position decides the exam: even is `mid`, odd is `final`.
fn exam_for_position(position: usize) -> ExamType {
    if position % 2 == 0 {
        ExamType::Mid
    } else {
        ExamType::Final
    }
}

/// Replaces the seed subject's generated questions with `SEED_QUESTIONS`.
///
/// Runs in one transaction and can be repeated: earlier generated questions of
/// the subject are removed first, past-exam questions are left alone.
/// Returns the number of questions inserted.
pub async fn seed_ai_questions(pool: &SqlitePool) -> Result<usize, AppError> {
    let mut tx = pool.begin().await?;

    let repaired = sqlx::query(
        r#"
        UPDATE subjects SET name = $1
        WHERE name = $2
          AND NOT EXISTS (SELECT 1 FROM subjects WHERE name = $1)
        "#,
    )
    .bind(SEED_SUBJECT)
    .bind(MOJIBAKE_SUBJECT)
    .execute(&mut *tx)
    .await?;
    if repaired.rows_affected() > 0 {
        tracing::info!("Repaired garbled subject name to '{}'", SEED_SUBJECT);
    }

    let subject_id = content::subject_id_for_name(&mut *tx, SEED_SUBJECT).await?;

    let removed = sqlx::query("DELETE FROM questions WHERE subject_id = $1 AND source = 'ai'")
        .bind(subject_id)
        .execute(&mut *tx)
        .await?;
    tracing::debug!("Removed {} old generated questions", removed.rows_affected());

    for (index, seed) in SEED_QUESTIONS.iter().enumerate() {
        let [a, b, c, d] = seed.choices;
        let question = NewQuestion {
            subject_id,
            exam_type: exam_for_position(index + 1),
            question_text: seed.text.to_string(),
            choice_a: a.to_string(),
            choice_b: b.to_string(),
            choice_c: c.to_string(),
            choice_d: d.to_string(),
            correct_choice: seed.correct,
            image_path: None,
            source: Source::Ai,
            explanation: Some(seed.explanation.to_string()),
        };
        content::create_question(&mut *tx, &question).await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Inserted {} AI questions for subject '{}'",
        SEED_QUESTIONS.len(),
        SEED_SUBJECT
    );
    Ok(SEED_QUESTIONS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        services::{
            quiz::{self, QuestionFilter, Scope},
            test_support::*,
        },
    };

    fn ai_scope() -> QuestionFilter {
        QuestionFilter {
            scope: Scope {
                source: Source::Ai,
                exam: None,
            },
            search: None,
        }
    }

    #[test]
    fn exam_alternates_starting_with_final() {
        assert_eq!(exam_for_position(1), ExamType::Final);
        assert_eq!(exam_for_position(2), ExamType::Mid);
        assert_eq!(exam_for_position(41), ExamType::Final);
    }

    #[tokio::test]
    async fn seeding_is_repeatable_and_keeps_past_questions() {
        let pool = db::memory_pool().await.unwrap();

        assert_eq!(seed_ai_questions(&pool).await.unwrap(), 41);
        let subjects = content::list_subjects(&pool).await.unwrap();
        assert_eq!(subjects.len(), 1);
        let subject_id = subjects[0].id;
        question(&pool, subject_id, "A past exam question").await;

        assert_eq!(seed_ai_questions(&pool).await.unwrap(), 41);

        let ai = quiz::list_questions(&pool, subject_id, &ai_scope(), 1).await.unwrap();
        assert_eq!(ai.total, 41);
        let mids = ai
            .questions
            .iter()
            .filter(|q| q.exam_type == ExamType::Mid)
            .count();
        // The first page holds the 50 newest, which is all 41.
        assert_eq!(mids, 20);
        assert_eq!(content::count_questions(&pool).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn garbled_subject_name_is_repaired() {
        let pool = db::memory_pool().await.unwrap();
        let garbled = subject(&pool, MOJIBAKE_SUBJECT).await;

        seed_ai_questions(&pool).await.unwrap();

        let subjects = content::list_subjects(&pool).await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, garbled);
        assert_eq!(subjects[0].name, SEED_SUBJECT);
    }
}
